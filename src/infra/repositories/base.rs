//! Query helpers shared by the stores.

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, Order, PaginatorTrait, Select};

use crate::errors::AppResult;
use crate::types::{PaginationParams, SortOrder};

/// Fetch one page of `select` together with the total row count.
pub(crate) async fn fetch_page<'db, E, C>(
    select: Select<E>,
    conn: &'db C,
    params: &PaginationParams,
) -> AppResult<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Sync + 'db,
    C: ConnectionTrait,
{
    let paginator = select.paginate(conn, params.limit());
    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(params.page.saturating_sub(1)).await?;
    Ok((rows, total))
}

/// Case-insensitive substring match on a text column.
pub(crate) fn icontains<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column))).like(
        sea_orm::sea_query::LikeExpr::new(pattern).escape('\\'),
    )
}

/// Translate a parsed ordering into a SeaORM direction.
pub(crate) fn direction<F>(sort: &SortOrder<F>) -> Order {
    if sort.descending {
        Order::Desc
    } else {
        Order::Asc
    }
}

pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("marina"), "marina");
    }
}
