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

use crate::domain::models::request::{AnalysisRequest, RequestStatus};
use crate::domain::repositories::request_repository::{RepositoryError, RequestRepository};
use crate::infrastructure::database::entities::analysis_request as request_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 分析请求仓库实现
///
/// 基于SeaORM实现的请求数据访问层
#[derive(Clone)]
pub struct RequestRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl RequestRepositoryImpl {
    /// 创建新的请求仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<request_entity::Model> for AnalysisRequest {
    fn from(model: request_entity::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            email: model.email,
            status: model.status.parse().unwrap_or_default(),
            error_message: model.error_message,
            created_at: model.created_at,
            completed_at: model.completed_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<AnalysisRequest> for request_entity::ActiveModel {
    fn from(request: AnalysisRequest) -> Self {
        Self {
            id: Set(request.id),
            url: Set(request.url),
            email: Set(request.email),
            status: Set(request.status.to_string()),
            error_message: Set(request.error_message),
            created_at: Set(request.created_at),
            completed_at: Set(request.completed_at),
            updated_at: Set(request.updated_at),
        }
    }
}

#[async_trait]
impl RequestRepository for RequestRepositoryImpl {
    async fn create(&self, request: &AnalysisRequest) -> Result<AnalysisRequest, RepositoryError> {
        let model: request_entity::ActiveModel = request.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(request.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AnalysisRequest>, RepositoryError> {
        let model = request_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AnalysisRequest>, RepositoryError> {
        let model = request_entity::Entity::find()
            .filter(request_entity::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn mark_processing(&self, id: Uuid) -> Result<(), RepositoryError> {
        // Filtered update keeps the pending->processing transition atomic
        let result = request_entity::Entity::update_many()
            .col_expr(
                request_entity::Column::Status,
                RequestStatus::Processing.to_string().into(),
            )
            .col_expr(
                request_entity::Column::UpdatedAt,
                Utc::now().fixed_offset().into(),
            )
            .filter(request_entity::Column::Id.eq(id))
            .filter(request_entity::Column::Status.eq(RequestStatus::Pending.to_string()))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return match self.find_by_id(id).await? {
                Some(_) => Err(RepositoryError::Conflict),
                None => Err(RepositoryError::NotFound),
            };
        }
        Ok(())
    }

    async fn mark_completed(&self, id: Uuid) -> Result<(), RepositoryError> {
        let now = Utc::now().fixed_offset();
        let model = request_entity::ActiveModel {
            id: Set(id),
            status: Set(RequestStatus::Completed.to_string()),
            completed_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };

        model.update(self.db.as_ref()).await?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), RepositoryError> {
        let now = Utc::now().fixed_offset();
        let model = request_entity::ActiveModel {
            id: Set(id),
            status: Set(RequestStatus::Failed.to_string()),
            error_message: Set(Some(error.to_string())),
            completed_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };

        model.update(self.db.as_ref()).await?;
        Ok(())
    }
}
