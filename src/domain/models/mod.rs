// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod extracted;
pub mod grade;
pub mod metadata;
pub mod pillar;
pub mod request;
pub mod vision;
