//! Access policy.
//!
//! A pure function of (actor, action, target). Roles are resolved by the
//! caller for each request; nothing is cached here. Anything not granted
//! explicitly is denied.

use uuid::Uuid;

use super::role::RoleSet;
use crate::errors::{AppError, AppResult};

/// Authenticated account with its roles as loaded for this request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub roles: RoleSet,
    /// Agent profile id, when the account has one
    pub agent_id: Option<Uuid>,
}

impl Principal {
    pub fn is_staff(&self) -> bool {
        self.roles.is_staff()
    }
}

/// Whoever issued the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(Principal),
}

impl Actor {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Actor::Anonymous => None,
            Actor::User(principal) => Some(principal),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.principal().map(|p| p.user_id)
    }

    pub fn agent_id(&self) -> Option<Uuid> {
        self.principal().and_then(|p| p.agent_id)
    }

    pub fn is_staff(&self) -> bool {
        self.principal().is_some_and(Principal::is_staff)
    }

    /// The authenticated principal, or a permission error.
    pub fn require_user(&self) -> AppResult<&Principal> {
        self.principal().ok_or(AppError::Forbidden)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

/// What the actor wants to touch, with the facts the rules depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Area,
    Property,
    /// Uploading images to a property
    PropertyImages { assigned_agent: Option<Uuid> },
    Agent,
    MarketReport,
    MarketTrend,
    MarketStatistic,
    BlogPost { author_id: Uuid, published: bool },
    /// Creating a post; the actor becomes its author
    NewBlogPost,
    Favorites,
    Favorite { owner_id: Uuid },
    NewInquiry,
    /// Processing or deleting an inquiry
    Inquiry { property_agent: Option<Uuid> },
    Profile { user_id: Uuid },
    RoleAssignments,
}

impl Target {
    fn name(&self) -> &'static str {
        match self {
            Target::Area => "area",
            Target::Property => "property",
            Target::PropertyImages { .. } => "property_images",
            Target::Agent => "agent",
            Target::MarketReport => "market_report",
            Target::MarketTrend => "market_trend",
            Target::MarketStatistic => "market_statistic",
            Target::BlogPost { .. } | Target::NewBlogPost => "blog_post",
            Target::Favorites | Target::Favorite { .. } => "favorite",
            Target::NewInquiry | Target::Inquiry { .. } => "inquiry",
            Target::Profile { .. } => "profile",
            Target::RoleAssignments => "role",
        }
    }
}

/// Decide whether `actor` may perform `action` on `target`.
///
/// # Errors
/// `AppError::Forbidden` when denied.
pub fn authorize(actor: &Actor, action: Action, target: &Target) -> AppResult<()> {
    if allows(actor, action, target) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = ?actor.user_id(),
            action = ?action,
            target = target.name(),
            "Permission denied"
        );
        Err(AppError::Forbidden)
    }
}

fn allows(actor: &Actor, action: Action, target: &Target) -> bool {
    let principal = actor.principal();
    let staff = actor.is_staff();

    match (action, target) {
        (Action::Read, Target::Area)
        | (Action::Read, Target::Property)
        | (Action::Read, Target::PropertyImages { .. })
        | (Action::Read, Target::Agent)
        | (Action::Read, Target::MarketReport)
        | (Action::Read, Target::MarketTrend)
        | (Action::Read, Target::MarketStatistic) => true,

        (Action::Write, Target::Area)
        | (Action::Write, Target::Agent)
        | (Action::Write, Target::MarketReport)
        | (Action::Write, Target::MarketTrend)
        | (Action::Write, Target::MarketStatistic)
        | (_, Target::RoleAssignments) => staff,

        (Action::Write, Target::Property) => {
            principal.is_some_and(|p| p.roles.can_list_properties())
        }

        (Action::Write, Target::PropertyImages { assigned_agent }) => {
            staff || (assigned_agent.is_some() && *assigned_agent == actor.agent_id())
        }

        (Action::Read, Target::BlogPost { author_id, published }) => {
            *published || staff || actor.user_id() == Some(*author_id)
        }
        (Action::Write, Target::BlogPost { author_id, .. }) => {
            staff || actor.user_id() == Some(*author_id)
        }
        (_, Target::NewBlogPost) => principal.is_some(),

        (_, Target::Favorites) => principal.is_some(),
        (_, Target::Favorite { owner_id }) => actor.user_id() == Some(*owner_id),

        (_, Target::NewInquiry) => true,
        (_, Target::Inquiry { property_agent }) => {
            staff || (property_agent.is_some() && *property_agent == actor.agent_id())
        }

        (_, Target::Profile { user_id }) => staff || actor.user_id() == Some(*user_id),
    }
}

/// Which inquiries a listing may return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryScope {
    All,
    /// Inquiries on the agent's properties plus the ones the user sent
    Agent { agent_id: Uuid, user_id: Uuid },
    Own(Uuid),
}

/// # Errors
/// `AppError::Forbidden` for anonymous actors.
pub fn inquiry_scope(actor: &Actor) -> AppResult<InquiryScope> {
    let principal = actor.require_user()?;
    if principal.is_staff() {
        return Ok(InquiryScope::All);
    }
    Ok(match principal.agent_id {
        Some(agent_id) => InquiryScope::Agent {
            agent_id,
            user_id: principal.user_id,
        },
        None => InquiryScope::Own(principal.user_id),
    })
}

/// Which blog posts a listing may return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogScope {
    All,
    Published,
}

pub fn blog_scope(actor: &Actor) -> BlogScope {
    if actor.is_staff() {
        BlogScope::All
    } else {
        BlogScope::Published
    }
}

/// Which profiles a listing may return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileScope {
    All,
    Only(Uuid),
}

/// # Errors
/// `AppError::Forbidden` for anonymous actors.
pub fn profile_scope(actor: &Actor) -> AppResult<ProfileScope> {
    let principal = actor.require_user()?;
    Ok(if principal.is_staff() {
        ProfileScope::All
    } else {
        ProfileScope::Only(principal.user_id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::Role;

    fn actor(roles: &[Role], agent_id: Option<Uuid>) -> Actor {
        Actor::User(Principal {
            user_id: Uuid::new_v4(),
            roles: roles.iter().copied().collect(),
            agent_id,
        })
    }

    fn denied(result: AppResult<()>) -> bool {
        matches!(result, Err(AppError::Forbidden))
    }

    #[test]
    fn test_public_reads() {
        for target in [Target::Area, Target::Property, Target::MarketReport, Target::Agent] {
            assert!(authorize(&Actor::Anonymous, Action::Read, &target).is_ok());
        }
    }

    #[test]
    fn test_area_writes_need_staff() {
        let agent = actor(&[Role::User, Role::Agent], Some(Uuid::new_v4()));
        let admin = actor(&[Role::Admin], None);

        assert!(denied(authorize(&Actor::Anonymous, Action::Write, &Target::Area)));
        assert!(denied(authorize(&agent, Action::Write, &Target::Area)));
        assert!(authorize(&admin, Action::Write, &Target::Area).is_ok());
        assert!(authorize(&actor(&[Role::Superadmin], None), Action::Write, &Target::MarketTrend).is_ok());
    }

    #[test]
    fn test_property_writes_need_agent_or_staff() {
        let user = actor(&[Role::User], None);
        let agent = actor(&[Role::Agent], Some(Uuid::new_v4()));

        assert!(denied(authorize(&Actor::Anonymous, Action::Write, &Target::Property)));
        assert!(denied(authorize(&user, Action::Write, &Target::Property)));
        assert!(authorize(&agent, Action::Write, &Target::Property).is_ok());
    }

    #[test]
    fn test_image_upload_needs_assigned_agent() {
        let agent_id = Uuid::new_v4();
        let agent = actor(&[Role::Agent], Some(agent_id));
        let other_agent = actor(&[Role::Agent], Some(Uuid::new_v4()));
        let admin = actor(&[Role::Admin], None);

        let assigned = Target::PropertyImages { assigned_agent: Some(agent_id) };
        let unassigned = Target::PropertyImages { assigned_agent: None };

        assert!(authorize(&agent, Action::Write, &assigned).is_ok());
        assert!(denied(authorize(&other_agent, Action::Write, &assigned)));
        assert!(denied(authorize(&agent, Action::Write, &unassigned)));
        assert!(authorize(&admin, Action::Write, &unassigned).is_ok());
    }

    #[test]
    fn test_unpublished_posts_visible_to_author_and_staff() {
        let author = actor(&[Role::User], None);
        let author_id = author.user_id().unwrap();
        let draft = Target::BlogPost { author_id, published: false };

        assert!(authorize(&author, Action::Read, &draft).is_ok());
        assert!(authorize(&author, Action::Write, &draft).is_ok());
        assert!(denied(authorize(&actor(&[Role::User], None), Action::Read, &draft)));
        assert!(denied(authorize(&Actor::Anonymous, Action::Read, &draft)));
        assert!(authorize(&actor(&[Role::Admin], None), Action::Read, &draft).is_ok());

        let published = Target::BlogPost { author_id, published: true };
        assert!(authorize(&Actor::Anonymous, Action::Read, &published).is_ok());
        assert!(denied(authorize(&Actor::Anonymous, Action::Write, &Target::NewBlogPost)));
    }

    #[test]
    fn test_inquiry_scopes() {
        let agent_id = Uuid::new_v4();
        let agent = actor(&[Role::User, Role::Agent], Some(agent_id));
        let user = actor(&[Role::User], None);

        assert!(denied(inquiry_scope(&Actor::Anonymous).map(|_| ())));
        assert_eq!(inquiry_scope(&actor(&[Role::Admin], None)).unwrap(), InquiryScope::All);
        assert_eq!(
            inquiry_scope(&agent).unwrap(),
            InquiryScope::Agent { agent_id, user_id: agent.user_id().unwrap() }
        );
        assert_eq!(inquiry_scope(&user).unwrap(), InquiryScope::Own(user.user_id().unwrap()));
        assert!(authorize(&Actor::Anonymous, Action::Write, &Target::NewInquiry).is_ok());
    }

    #[test]
    fn test_inquiry_processing() {
        let agent_id = Uuid::new_v4();
        let agent = actor(&[Role::Agent], Some(agent_id));
        let target = Target::Inquiry { property_agent: Some(agent_id) };

        assert!(authorize(&agent, Action::Write, &target).is_ok());
        assert!(denied(authorize(&actor(&[Role::User], None), Action::Write, &target)));
    }

    #[test]
    fn test_favorites_are_owner_only() {
        let user = actor(&[Role::User], None);
        let owner_id = user.user_id().unwrap();

        assert!(authorize(&user, Action::Write, &Target::Favorite { owner_id }).is_ok());
        assert!(denied(authorize(&user, Action::Write, &Target::Favorite { owner_id: Uuid::new_v4() })));
        assert!(denied(authorize(&Actor::Anonymous, Action::Read, &Target::Favorites)));
    }

    #[test]
    fn test_profiles_and_roles() {
        let user = actor(&[Role::User], None);
        let admin = actor(&[Role::Admin], None);
        let own = Target::Profile { user_id: user.user_id().unwrap() };
        let other = Target::Profile { user_id: Uuid::new_v4() };

        assert!(authorize(&user, Action::Write, &own).is_ok());
        assert!(denied(authorize(&user, Action::Read, &other)));
        assert!(authorize(&admin, Action::Write, &other).is_ok());
        assert!(denied(authorize(&user, Action::Write, &Target::RoleAssignments)));
        assert_eq!(profile_scope(&admin).unwrap(), ProfileScope::All);
        assert_eq!(blog_scope(&user), BlogScope::Published);
        assert_eq!(blog_scope(&admin), BlogScope::All);
    }
}
