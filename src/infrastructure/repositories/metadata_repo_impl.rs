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

use crate::domain::models::metadata::AnalysisMetadata;
use crate::domain::repositories::metadata_repository::MetadataRepository;
use crate::domain::repositories::request_repository::RepositoryError;
use crate::infrastructure::database::entities::analysis_metadata as metadata_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;
use uuid::Uuid;

/// 分析元数据仓库实现
#[derive(Clone)]
pub struct MetadataRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl MetadataRepositoryImpl {
    /// 创建新的元数据仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<metadata_entity::Model> for AnalysisMetadata {
    fn from(model: metadata_entity::Model) -> Self {
        Self {
            request_id: model.request_id,
            extracted: model.extracted,
            overall_score: model.overall_score.map(|s| s.max(0) as u32),
            duration_ms: model.duration_ms,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[async_trait]
impl MetadataRepository for MetadataRepositoryImpl {
    async fn create(&self, metadata: &AnalysisMetadata) -> Result<(), RepositoryError> {
        let model = metadata_entity::ActiveModel {
            request_id: Set(metadata.request_id),
            extracted: Set(metadata.extracted.clone()),
            overall_score: Set(metadata.overall_score.map(|s| s.min(100) as i32)),
            duration_ms: Set(metadata.duration_ms),
            created_at: Set(metadata.created_at),
            updated_at: Set(metadata.updated_at),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_by_request_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<AnalysisMetadata>, RepositoryError> {
        let model = metadata_entity::Entity::find_by_id(request_id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn set_extracted(
        &self,
        request_id: Uuid,
        extracted: serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let model = metadata_entity::ActiveModel {
            request_id: Set(request_id),
            extracted: Set(Some(extracted)),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };

        model.update(self.db.as_ref()).await?;
        Ok(())
    }

    async fn set_aggregate(
        &self,
        request_id: Uuid,
        overall_score: u32,
        duration_ms: i64,
    ) -> Result<(), RepositoryError> {
        let model = metadata_entity::ActiveModel {
            request_id: Set(request_id),
            overall_score: Set(Some(overall_score.min(100) as i32)),
            duration_ms: Set(Some(duration_ms)),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };

        model.update(self.db.as_ref()).await?;
        Ok(())
    }
}
