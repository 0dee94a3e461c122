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

use crate::domain::models::pillar::{PillarName, PillarResult};
use crate::domain::repositories::request_repository::RepositoryError;
use crate::domain::repositories::result_repository::ResultRepository;
use crate::infrastructure::database::entities::analysis_result as result_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 支柱结果仓库实现
///
/// analysis_results 表只追加写入，每条支柱结果插入后不再修改。
#[derive(Clone)]
pub struct ResultRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ResultRepositoryImpl {
    /// 创建新的结果仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<result_entity::Model> for PillarResult {
    fn from(model: result_entity::Model) -> Self {
        Self {
            pillar: model
                .pillar
                .parse()
                .unwrap_or(PillarName::Performance),
            score: model.score.max(0) as u32,
            analyzed: model.analyzed,
            insights: model.insights,
            recommendations: serde_json::from_value(model.recommendations).unwrap_or_default(),
            raw: model.raw,
            error: model.error_message,
        }
    }
}

#[async_trait]
impl ResultRepository for ResultRepositoryImpl {
    async fn save(&self, request_id: Uuid, result: &PillarResult) -> Result<(), RepositoryError> {
        let model = result_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            request_id: Set(request_id),
            pillar: Set(result.pillar.to_string()),
            score: Set(result.score.min(100) as i32),
            analyzed: Set(result.analyzed),
            insights: Set(result.insights.clone()),
            recommendations: Set(serde_json::json!(result.recommendations)),
            raw: Set(result.raw.clone()),
            error_message: Set(result.error.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_by_request_id(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<PillarResult>, RepositoryError> {
        let models = result_entity::Entity::find()
            .filter(result_entity::Column::RequestId.eq(request_id))
            .order_by_asc(result_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
