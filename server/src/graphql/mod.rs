use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Object, Schema};
use chrono::Utc;
use entity::{Employee, EmployeeId, PeerRecognition, Perk};
use platform_api::ApiError;
use platform_db::SharedStore;
use products_recognition::{
    AwardReceipt, AwardRequest, EmployeeSummary, MessageGenerator, PeerAwardRequest, PeerReceipt,
    RecognitionError, RedeemRequest, RedemptionReceipt, TeamStats, award_kudos, employee_summary,
    leaderboard, peer_recognize, ranked, redeem_perk, team_stats,
};
use tracing::instrument;

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(Clone)]
pub struct GraphqlData {
    pub store: SharedStore,
    pub messages: Arc<dyn MessageGenerator>,
    pub leaderboard_size: usize,
}

pub fn build_schema(data: GraphqlData) -> SchemaType {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(data)
        .finish()
}

fn data<'a>(ctx: &'a Context<'_>) -> async_graphql::Result<&'a GraphqlData> {
    ctx.data::<GraphqlData>()
        .map_err(|_| ApiError::internal(anyhow::anyhow!("missing graphql data")).extend())
}

fn domain_error(err: RecognitionError) -> async_graphql::Error {
    ApiError::from(err).extend()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.employees", skip_all)]
    async fn employees(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Employee>> {
        let store = data(ctx)?.store.read().await;
        Ok(store.employees().to_vec())
    }

    #[instrument(name = "graphql.employee", skip(self, ctx))]
    async fn employee(
        &self,
        ctx: &Context<'_>,
        id: EmployeeId,
    ) -> async_graphql::Result<Option<Employee>> {
        let store = data(ctx)?.store.read().await;
        Ok(store.employee(id).cloned())
    }

    #[instrument(name = "graphql.employee_summary", skip(self, ctx))]
    async fn employee_summary(
        &self,
        ctx: &Context<'_>,
        id: EmployeeId,
    ) -> async_graphql::Result<EmployeeSummary> {
        let store = data(ctx)?.store.read().await;
        employee_summary(&store, id).map_err(domain_error)
    }

    #[instrument(name = "graphql.perks", skip_all)]
    async fn perks(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Perk>> {
        let store = data(ctx)?.store.read().await;
        Ok(store.perks().to_vec())
    }

    /// Newest first.
    #[instrument(name = "graphql.peer_recognitions", skip_all)]
    async fn peer_recognitions(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<PeerRecognition>> {
        let store = data(ctx)?.store.read().await;
        Ok(store.peer_recognitions().cloned().collect())
    }

    #[instrument(name = "graphql.leaderboard", skip(self, ctx))]
    async fn leaderboard(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
    ) -> async_graphql::Result<Vec<Employee>> {
        let data = data(ctx)?;
        let limit = match limit {
            Some(limit) if limit < 1 => {
                return Err(ApiError::InvalidInput("limit must be at least 1".into()).extend());
            }
            Some(limit) => limit as usize,
            None => data.leaderboard_size,
        };
        let store = data.store.read().await;
        Ok(leaderboard(store.employees(), limit)
            .into_iter()
            .cloned()
            .collect())
    }

    #[instrument(name = "graphql.rankings", skip_all)]
    async fn rankings(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Employee>> {
        let store = data(ctx)?.store.read().await;
        Ok(ranked(store.employees()).into_iter().cloned().collect())
    }

    #[instrument(name = "graphql.stats", skip_all)]
    async fn stats(&self, ctx: &Context<'_>) -> async_graphql::Result<TeamStats> {
        let store = data(ctx)?.store.read().await;
        Ok(team_stats(&store))
    }

    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    #[instrument(name = "graphql.award_kudos", skip_all)]
    async fn award_kudos(
        &self,
        ctx: &Context<'_>,
        input: AwardRequest,
    ) -> async_graphql::Result<AwardReceipt> {
        let data = data(ctx)?;
        let mut store = data.store.write().await;
        award_kudos(&mut store, &input, data.messages.as_ref(), Utc::now()).map_err(domain_error)
    }

    #[instrument(name = "graphql.peer_recognize", skip_all)]
    async fn peer_recognize(
        &self,
        ctx: &Context<'_>,
        input: PeerAwardRequest,
    ) -> async_graphql::Result<PeerReceipt> {
        let data = data(ctx)?;
        let mut store = data.store.write().await;
        peer_recognize(&mut store, &input, data.messages.as_ref(), Utc::now())
            .map_err(domain_error)
    }

    #[instrument(name = "graphql.redeem_perk", skip_all)]
    async fn redeem_perk(
        &self,
        ctx: &Context<'_>,
        input: RedeemRequest,
    ) -> async_graphql::Result<RedemptionReceipt> {
        let data = data(ctx)?;
        let mut store = data.store.write().await;
        redeem_perk(&mut store, &input, Utc::now()).map_err(domain_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{Request, Value};
    use platform_db::{RecordStore, Seed};
    use serde_json::json;

    struct Plain;

    impl MessageGenerator for Plain {
        fn generate(&self, employee_name: &str, reason: &str, points: i64) -> String {
            format!("{employee_name}: {reason} (+{points})")
        }
    }

    fn schema() -> SchemaType {
        let store = RecordStore::from_seed(Seed::demo()).unwrap().into_shared();
        build_schema(GraphqlData {
            store,
            messages: Arc::new(Plain),
            leaderboard_size: 3,
        })
    }

    fn error_code(response: &async_graphql::Response) -> Option<Value> {
        response.errors[0]
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned()
    }

    #[tokio::test]
    async fn leaderboard_uses_configured_size() {
        let response = schema()
            .execute(Request::new("{ leaderboard { name pointsBalance } }"))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"leaderboard": [
                {"name": "David Kim", "pointsBalance": 200},
                {"name": "Michael Brown", "pointsBalance": 180},
                {"name": "Maria Rodriguez", "pointsBalance": 150},
            ]})
        );
    }

    #[tokio::test]
    async fn zero_limit_is_rejected() {
        let response = schema()
            .execute(Request::new("{ leaderboard(limit: 0) { id } }"))
            .await;
        assert_eq!(error_code(&response), Some(Value::from("INVALID_INPUT")));
    }

    #[tokio::test]
    async fn award_repays_outstanding_advance() {
        let schema = schema();
        let response = schema
            .execute(Request::new(
                r#"mutation {
                    awardKudos(input: {employeeId: 3, reason: "Great demo", points: 70}) {
                        loanRepaid
                        message
                        employee { pointsBalance loanHistory { repaymentStatus } }
                    }
                }"#,
            ))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"awardKudos": {
                "loanRepaid": true,
                "message": "Sarah Johnson: Great demo (+70)",
                "employee": {
                    "pointsBalance": 20,
                    "loanHistory": [{"repaymentStatus": "REPAID"}],
                },
            }})
        );
    }

    #[tokio::test]
    async fn peer_shortfall_reports_insufficient_funds() {
        let schema = schema();
        let response = schema
            .execute(Request::new(
                r#"mutation {
                    peerRecognize(input: {fromEmployeeId: 7, toEmployeeId: 2, reason: "Help", points: 500}) {
                        loanRepaid
                    }
                }"#,
            ))
            .await;
        assert_eq!(
            error_code(&response),
            Some(Value::from("INSUFFICIENT_FUNDS"))
        );

        let after = schema
            .execute(Request::new("{ employee(id: 7) { pointsBalance } }"))
            .await;
        assert_eq!(
            after.data.into_json().unwrap(),
            json!({"employee": {"pointsBalance": 75}})
        );
    }

    #[tokio::test]
    async fn second_advance_conflicts() {
        let response = schema()
            .execute(Request::new(
                "mutation { redeemPerk(input: {employeeId: 3, perkId: 1}) { isAdvance } }",
            ))
            .await;
        assert_eq!(error_code(&response), Some(Value::from("CONFLICT")));
    }

    #[tokio::test]
    async fn unknown_employee_summary_is_not_found() {
        let response = schema()
            .execute(Request::new("{ employeeSummary(id: 99) { name } }"))
            .await;
        assert_eq!(error_code(&response), Some(Value::from("NOT_FOUND")));
        assert_eq!(response.errors[0].message, "Employee not found");
    }
}
