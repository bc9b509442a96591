use async_trait::async_trait;
use group_types::{
    CreateOrMatchRequest, CreateOrMatchResponse, Group, GroupId, GroupRecord, GroupResult,
    JoinRequest,
};

/// Operations offered by the remote group service.
///
/// The calling user is bound to the implementation, not passed per call.
/// Network failures surface as [`GroupError::Transient`](group_types::GroupError::Transient);
/// domain refusals keep their taxonomy (`NotFound`, `Terminal`, `Conflict`,
/// `Validation`).
#[async_trait]
pub trait GroupService: Send + Sync {
    async fn create_or_match(
        &self,
        request: &CreateOrMatchRequest,
    ) -> GroupResult<CreateOrMatchResponse>;

    async fn join(&self, group_id: &GroupId, request: &JoinRequest) -> GroupResult<GroupRecord>;

    async fn leave(&self, group_id: &GroupId) -> GroupResult<()>;

    async fn group(&self, group_id: &GroupId) -> GroupResult<GroupRecord>;

    async fn upcoming(&self) -> GroupResult<Vec<Group>>;
}
