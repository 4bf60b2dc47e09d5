//! Shared types for list endpoints and response bodies.

mod ordering;
mod pagination;
mod response;

pub use ordering::SortOrder;
pub use pagination::{
    AgentPage, AreaPage, BlogPage, FavoritePage, InquiryPage, Paginated, PaginationMeta,
    PaginationParams, PropertyPage, ReportPage, TrendPage, UserPage,
};
pub use response::{Created, NoContent};
