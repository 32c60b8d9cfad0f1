//! Member handlers and login.
//!
//! # Invariants
//! - Members list exactly their own record, subject to the same filters
//!   and paging as an admin listing.
//! - Another member's record is reported as not found to non-admins.
//! - Member self-updates may only touch height and weight.

use crate::access::{
    authorize, authorize_member_patch, ensure_member_visible, Action, Principal, Resource,
};
use crate::api::views::MemberView;
use crate::api::{ApiContext, ApiError, ApiResult};
use crate::auth::authenticate;
use crate::model::member::{MemberDraft, MemberId, MemberPatch};
use crate::repo::{MemberListQuery, SqliteRepository};
use crate::service::member_service::MemberService;

impl ApiContext<'_> {
    fn members(&self) -> ApiResult<MemberService<SqliteRepository<'_>>> {
        Ok(MemberService::new(self.repo()?))
    }

    /// Resolves phone + password into a principal.
    pub fn login(&self, phone_number: &str, password: &str) -> ApiResult<Principal> {
        let repo = self.repo()?;
        Ok(authenticate(&repo, phone_number, password)?)
    }

    pub fn list_members(
        &self,
        caller: Option<&Principal>,
        query: &MemberListQuery,
    ) -> ApiResult<Vec<MemberView>> {
        let principal = authorize(caller, Resource::Member, Action::List)?;
        let service = self.members()?;

        if principal.is_admin() {
            let profiles = service.profiles(query, self.today())?;
            return Ok(profiles.into_iter().map(MemberView::from).collect());
        }

        let own = service
            .profile(principal.member_id, self.today())?
            .filter(|profile| query.active_on.map_or(true, |day| profile.member.is_active_on(day)));
        Ok(query
            .page
            .paginate(own)
            .into_iter()
            .map(MemberView::from)
            .collect())
    }

    pub fn retrieve_member(&self, caller: Option<&Principal>, id: MemberId) -> ApiResult<MemberView> {
        let principal = authorize(caller, Resource::Member, Action::Retrieve)?;
        ensure_member_visible(principal, id)?;
        self.members()?
            .profile(id, self.today())?
            .map(MemberView::from)
            .ok_or(ApiError::NotFound { entity: "member" })
    }

    pub fn create_member(
        &self,
        caller: Option<&Principal>,
        draft: &MemberDraft,
    ) -> ApiResult<MemberView> {
        authorize(caller, Resource::Member, Action::Create)?;
        let service = self.members()?;
        let member = service.register(draft, self.today())?;
        self.member_view(&service, member.id)
    }

    /// Partial update. Members may only patch their own height and weight.
    pub fn update_member(
        &self,
        caller: Option<&Principal>,
        id: MemberId,
        patch: &MemberPatch,
    ) -> ApiResult<MemberView> {
        let principal = authorize(caller, Resource::Member, Action::Update)?;
        authorize_member_patch(principal, id, patch)?;
        let service = self.members()?;
        service.apply_patch(id, patch, self.today())?;
        self.member_view(&service, id)
    }

    pub fn delete_member(&self, caller: Option<&Principal>, id: MemberId) -> ApiResult<()> {
        authorize(caller, Resource::Member, Action::Delete)?;
        Ok(self.members()?.delete(id)?)
    }

    fn member_view(
        &self,
        service: &MemberService<SqliteRepository<'_>>,
        id: MemberId,
    ) -> ApiResult<MemberView> {
        service
            .profile(id, self.today())?
            .map(MemberView::from)
            .ok_or(ApiError::NotFound { entity: "member" })
    }
}
