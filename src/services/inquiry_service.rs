//! Inquiries - contact requests about a property.
//!
//! Anyone may send one. Staff see every inquiry, agents see those on
//! their assigned properties plus their own, other users only their own.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::policy::{authorize, inquiry_scope};
use crate::domain::{Action, Actor, InquiryResponse, InquiryUpdate, NewInquiry, Target};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait InquiryService: Send + Sync {
    /// Record an inquiry, stamped with the actor when authenticated
    async fn create(&self, actor: &Actor, inquiry: NewInquiry) -> AppResult<InquiryResponse>;

    /// Inquiries visible to the actor, newest first
    async fn list(&self, actor: &Actor, params: PaginationParams) -> AppResult<Paginated<InquiryResponse>>;

    /// Mark processed or unprocessed
    async fn update(&self, actor: &Actor, id: Uuid, update: InquiryUpdate) -> AppResult<InquiryResponse>;

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

pub struct InquiryManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> InquiryManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Staff, or the agent assigned to the inquiry's property.
    async fn authorize_processing(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let ctx = self.uow.reader();
        let inquiry = ctx.engagement().find_inquiry(id).await?.ok_or_not_found()?;
        let property_agent = ctx
            .properties()
            .agents_of(&[inquiry.property_id])
            .await?
            .remove(&inquiry.property_id)
            .flatten();
        authorize(actor, Action::Write, &Target::Inquiry { property_agent })
    }
}

#[async_trait]
impl<U: UnitOfWork> InquiryService for InquiryManager<U> {
    async fn create(&self, actor: &Actor, inquiry: NewInquiry) -> AppResult<InquiryResponse> {
        authorize(actor, Action::Write, &Target::NewInquiry)?;
        inquiry.check()?;
        let user_id = actor.user_id();

        let created = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    if !tx.properties().exists(inquiry.property_id).await? {
                        return Err(AppError::invalid_field("property_id", "Property does not exist"));
                    }
                    tx.engagement().insert_inquiry(&inquiry, user_id).await
                })
            })
            .await?;

        tracing::info!(
            inquiry_id = %created.id,
            property_id = %created.property_id,
            anonymous = user_id.is_none(),
            "Inquiry received"
        );
        Ok(InquiryResponse::from(created))
    }

    async fn list(&self, actor: &Actor, params: PaginationParams) -> AppResult<Paginated<InquiryResponse>> {
        let scope = inquiry_scope(actor)?;
        let (inquiries, total) = self
            .uow
            .reader()
            .engagement()
            .list_inquiries(scope, &params)
            .await?;
        let data = inquiries.into_iter().map(InquiryResponse::from).collect();
        Ok(Paginated::new(data, &params, total))
    }

    async fn update(&self, actor: &Actor, id: Uuid, update: InquiryUpdate) -> AppResult<InquiryResponse> {
        self.authorize_processing(actor, id).await?;

        let inquiry = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move { tx.engagement().set_processed(id, update.is_processed).await })
            })
            .await?;

        tracing::info!(inquiry_id = %id, is_processed = inquiry.is_processed, "Inquiry updated");
        Ok(InquiryResponse::from(inquiry))
    }

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        self.authorize_processing(actor, id).await?;

        let deleted = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.engagement().delete_inquiry(id).await }))
            .await?;

        if !deleted {
            return Err(AppError::NotFound);
        }
        tracing::info!(inquiry_id = %id, "Inquiry deleted");
        Ok(())
    }
}
