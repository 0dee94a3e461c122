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
    /// 应用数据库迁移
    ///
    /// # 参数
    ///
    /// * `manager` - 数据库模式管理器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 迁移成功
    /// * `Err(DbErr)` - 迁移失败
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Create analysis_requests table (No dependencies)
        manager
            .create_table(
                Table::create()
                    .table(AnalysisRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalysisRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnalysisRequests::Url).string().not_null())
                    .col(ColumnDef::new(AnalysisRequests::Email).string().not_null())
                    .col(ColumnDef::new(AnalysisRequests::Status).string().not_null())
                    .col(ColumnDef::new(AnalysisRequests::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(AnalysisRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AnalysisRequests::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalysisRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. Create analysis_results table (Depends on AnalysisRequests, append-only)
        manager
            .create_table(
                Table::create()
                    .table(AnalysisResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalysisResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnalysisResults::RequestId).uuid().not_null())
                    .col(ColumnDef::new(AnalysisResults::Pillar).string().not_null())
                    .col(ColumnDef::new(AnalysisResults::Score).integer().not_null())
                    .col(
                        ColumnDef::new(AnalysisResults::Analyzed)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnalysisResults::Insights).text().not_null())
                    .col(
                        ColumnDef::new(AnalysisResults::Recommendations)
                            .json()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnalysisResults::Raw).json().not_null())
                    .col(ColumnDef::new(AnalysisResults::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(AnalysisResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. Create analysis_metadata table (one row per request)
        manager
            .create_table(
                Table::create()
                    .table(AnalysisMetadata::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalysisMetadata::RequestId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnalysisMetadata::Extracted).json().null())
                    .col(
                        ColumnDef::new(AnalysisMetadata::OverallScore)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalysisMetadata::DurationMs)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalysisMetadata::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AnalysisMetadata::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    /// 回滚数据库迁移
    ///
    /// # 参数
    ///
    /// * `manager` - 数据库模式管理器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 回滚成功
    /// * `Err(DbErr)` - 回滚失败
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnalysisMetadata::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AnalysisResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AnalysisRequests::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum AnalysisRequests {
    Table,
    Id,
    Url,
    Email,
    Status,
    ErrorMessage,
    CreatedAt,
    CompletedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AnalysisResults {
    Table,
    Id,
    RequestId,
    Pillar,
    Score,
    Analyzed,
    Insights,
    Recommendations,
    Raw,
    ErrorMessage,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AnalysisMetadata {
    Table,
    RequestId,
    Extracted,
    OverallScore,
    DurationMs,
    CreatedAt,
    UpdatedAt,
}
