// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod metadata_repository;
pub mod request_repository;
pub mod result_repository;
