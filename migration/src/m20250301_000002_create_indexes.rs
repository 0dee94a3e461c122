// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Duplicate-submission checks scan by email
        manager
            .create_index(
                Index::create()
                    .name("idx_analysis_requests_email")
                    .table(AnalysisRequests::Table)
                    .col(AnalysisRequests::Email)
                    .to_owned(),
            )
            .await?;

        // Status endpoint loads pillar rows per request
        manager
            .create_index(
                Index::create()
                    .name("idx_analysis_results_request_id")
                    .table(AnalysisResults::Table)
                    .col(AnalysisResults::RequestId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analysis_results_request_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_analysis_requests_email").to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum AnalysisRequests {
    Table,
    Email,
}

#[derive(DeriveIden)]
enum AnalysisResults {
    Table,
    RequestId,
}
