//! Acompanhamento de pedidos com atualização otimista.
//!
//! Cada transição marca o pedido como pendente, aplica a mudança localmente,
//! envia ao backend e desfaz a mudança se a requisição falhar.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::{Local, Utc};
use tracing::{info, warn};

use crate::api::{OrderBackend, SectorMove, StatusUpdate, clean_note};
use crate::board::BoardColumns;
use crate::error::SapateiroError;
use crate::flow::{Actor, FlowError, Pedido, SectorCatalog, SectorId, SectorTransition};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Orders with a transition in flight.
#[derive(Debug, Default)]
pub struct PendingSet {
    inner: Mutex<HashSet<String>>,
}

impl PendingSet {
    /// Marks `id` as pending. `None` if it already is.
    pub fn try_begin(&self, id: &str) -> Option<PendingTicket<'_>> {
        if !lock(&self.inner).insert(id.to_string()) {
            return None;
        }
        Some(PendingTicket {
            set: self,
            id: id.to_string(),
        })
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        lock(&self.inner).contains(id)
    }
}

/// Clears the pending mark when dropped.
#[derive(Debug)]
pub struct PendingTicket<'a> {
    set: &'a PendingSet,
    id: String,
}

impl Drop for PendingTicket<'_> {
    fn drop(&mut self) {
        lock(&self.set.inner).remove(&self.id);
    }
}

#[derive(Debug, Default)]
struct BoardState {
    columns: BoardColumns,
    orders: Vec<Pedido>,
}

impl BoardState {
    fn find(&self, id: &str) -> Option<&Pedido> {
        self.orders.iter().find(|o| o.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Pedido> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    fn replace(&mut self, order: Pedido) {
        match self.find_mut(&order.id) {
            Some(slot) => *slot = order,
            None => self.orders.push(order),
        }
    }
}

/// Outcome of a sector transition, with the order as it now stands.
#[derive(Debug, Clone)]
pub struct TransitionReport {
    pub transition: SectorTransition,
    pub order: Pedido,
}

/// Local view of the board, kept in step with the backend.
///
/// Transitions are applied optimistically, sent to the backend, then either
/// reconciled with the server's answer or rolled back to the snapshot taken
/// before the change. At most one transition per order is in flight.
pub struct OrderTracker<B> {
    backend: B,
    catalog: SectorCatalog,
    state: Mutex<BoardState>,
    pending: PendingSet,
}

impl<B: OrderBackend> OrderTracker<B> {
    pub fn new(backend: B, catalog: SectorCatalog) -> Self {
        Self {
            backend,
            catalog,
            state: Mutex::new(BoardState::default()),
            pending: PendingSet::default(),
        }
    }

    pub fn catalog(&self) -> &SectorCatalog {
        &self.catalog
    }

    /// Reloads columns and orders from the backend.
    pub async fn refresh(&self) -> Result<(), SapateiroError> {
        let (columns, orders) = tokio::try_join!(
            self.backend.fetch_columns(),
            self.backend.fetch_board_orders()
        )?;

        for order in &orders {
            if let Err(err) = order.validate(&self.catalog) {
                warn!(order = %order.id, error = %err, "order violates sector flow invariants");
            }
        }
        info!(columns = columns.names().len(), orders = orders.len(), "board refreshed");

        let mut state = lock(&self.state);
        state.columns = columns;
        state.orders = orders;
        Ok(())
    }

    /// Refetches a single order and stores the server's copy.
    pub async fn reconcile(&self, id: &str) -> Result<Pedido, SapateiroError> {
        let order = self.backend.fetch_order(id).await?;
        lock(&self.state).replace(order.clone());
        Ok(order)
    }

    pub fn columns(&self) -> BoardColumns {
        lock(&self.state).columns.clone()
    }

    pub fn orders(&self) -> Vec<Pedido> {
        lock(&self.state).orders.clone()
    }

    pub fn order(&self, id: &str) -> Option<Pedido> {
        lock(&self.state).find(id).cloned()
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }

    fn begin(&self, id: &str) -> Result<PendingTicket<'_>, SapateiroError> {
        self.pending
            .try_begin(id)
            .ok_or_else(|| SapateiroError::TransitionPending(id.to_string()))
    }

    /// The order as the backend now has it after a successful write: the
    /// write's own answer, or a refetch when the backend only acknowledged.
    /// `None` when the refetch fails too; the write itself still stands.
    async fn confirmed(&self, id: &str, answer: Option<Pedido>) -> Option<Pedido> {
        if answer.is_some() {
            return answer;
        }
        match self.backend.fetch_order(id).await {
            Ok(order) => Some(order),
            Err(err) => {
                warn!(order = %id, error = %err, "refetch after write failed, keeping local copy");
                None
            }
        }
    }

    /// Moves an order to another board column.
    ///
    /// The server's answer only contributes the status and, when present, the
    /// status history; everything else stays as known locally.
    pub async fn change_status(
        &self,
        id: &str,
        status: &str,
        actor: &str,
        observacao: Option<&str>,
    ) -> Result<Pedido, SapateiroError> {
        let actor = Actor::new(actor)?;
        let _ticket = self.begin(id)?;

        let snapshot = {
            let mut state = lock(&self.state);
            if !state.columns.contains(status) {
                return Err(FlowError::UnknownColumn(status.to_string()).into());
            }
            let order = state
                .find_mut(id)
                .ok_or_else(|| SapateiroError::OrderNotFound(id.to_string()))?;
            let snapshot = order.clone();
            order.set_status(status, &actor, Local::now().naive_local());
            snapshot
        };

        let update = StatusUpdate {
            status: status.to_string(),
            funcionario_nome: actor.as_str().to_string(),
            observacao: clean_note(observacao),
        };
        match self.backend.update_status(id, &update).await {
            Ok(answer) => {
                let server = self.confirmed(id, answer).await;
                let mut state = lock(&self.state);
                let order = state
                    .find_mut(id)
                    .ok_or_else(|| SapateiroError::OrderNotFound(id.to_string()))?;
                if let Some(server) = server {
                    if !server.status.is_empty() {
                        order.status = server.status;
                    }
                    if !server.status_history.is_empty() {
                        order.status_history = server.status_history;
                    }
                }
                info!(order = %id, status = %order.status, actor = %actor.as_str(), "status updated");
                Ok(order.clone())
            }
            Err(err) => {
                warn!(order = %id, error = %err, "status update failed, rolling back");
                lock(&self.state).replace(snapshot);
                Err(err.into())
            }
        }
    }

    /// Advances an order to the next sector of its flow. From the last
    /// sector nothing is sent and the report carries
    /// [`SectorTransition::Terminal`].
    pub async fn advance(
        &self,
        id: &str,
        actor: &str,
        observacao: Option<&str>,
    ) -> Result<TransitionReport, SapateiroError> {
        self.transition_sector(id, actor, observacao, |order, catalog, actor| {
            order.advance(catalog, actor, Utc::now())
        })
        .await
    }

    /// Moves an order straight to `sector`.
    pub async fn move_to_sector(
        &self,
        id: &str,
        sector: SectorId,
        actor: &str,
        observacao: Option<&str>,
    ) -> Result<TransitionReport, SapateiroError> {
        self.transition_sector(id, actor, observacao, |order, catalog, actor| {
            order.move_to(catalog, sector, actor, Utc::now())
        })
        .await
    }

    async fn transition_sector<F>(
        &self,
        id: &str,
        actor: &str,
        observacao: Option<&str>,
        apply: F,
    ) -> Result<TransitionReport, SapateiroError>
    where
        F: FnOnce(&mut Pedido, &SectorCatalog, &Actor) -> Result<SectorTransition, FlowError>,
    {
        let actor = Actor::new(actor)?;
        let _ticket = self.begin(id)?;

        let (snapshot, transition, optimistic) = {
            let mut state = lock(&self.state);
            let order = state
                .find_mut(id)
                .ok_or_else(|| SapateiroError::OrderNotFound(id.to_string()))?;
            let snapshot = order.clone();
            let transition = apply(order, &self.catalog, &actor)?;
            (snapshot, transition, order.clone())
        };

        let Some(target) = transition.target() else {
            info!(order = %id, "order is already in its last sector");
            return Ok(TransitionReport {
                transition,
                order: optimistic,
            });
        };

        let body = SectorMove {
            setor_id: target,
            funcionario_nome: actor.as_str().to_string(),
            observacao: clean_note(observacao),
        };
        match self.backend.move_to_sector(id, &body).await {
            Ok(answer) => {
                let order = match self.confirmed(id, answer).await {
                    Some(server) => {
                        lock(&self.state).replace(server.clone());
                        server
                    }
                    None => optimistic,
                };
                info!(order = %id, sector = %target, actor = %actor.as_str(), "sector changed");
                if let SectorTransition::Finalized { .. } = transition {
                    info!(order = %id, "order finalized, client notification requested");
                }
                Ok(TransitionReport { transition, order })
            }
            Err(err) => {
                warn!(order = %id, error = %err, "sector move failed, rolling back");
                lock(&self.state).replace(snapshot);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use std::time::Duration;

    const COLUMNS: [&str; 3] = ["Lavagem - A Fazer", "Lavagem - Em Andamento", "Concluído"];

    /// Keeps its own copy of the orders; successful writes are committed to it.
    struct MockBackend {
        orders: Mutex<Vec<Pedido>>,
        fail: bool,
        /// Writes answer with a bare acknowledgement instead of the order.
        ack_only: bool,
        fetch_fails: bool,
        delay: Duration,
        calls: Mutex<Vec<String>>,
    }

    impl MockBackend {
        fn new(orders: Vec<Pedido>) -> Self {
            Self {
                orders: Mutex::new(orders),
                fail: false,
                ack_only: false,
                fetch_fails: false,
                delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn acknowledging(mut self) -> Self {
            self.ack_only = true;
            self
        }

        fn unreachable_on_refetch(mut self) -> Self {
            self.fetch_fails = true;
            self
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> Vec<String> {
            lock(&self.calls).clone()
        }

        fn find(&self, id: &str) -> Result<Pedido, ApiError> {
            lock(&self.orders)
                .iter()
                .find(|o| o.id == id)
                .cloned()
                .ok_or_else(|| ApiError::from_status(404, "Pedido não encontrado".into()))
        }

        fn commit(&self, order: Pedido) -> Option<Pedido> {
            let mut orders = lock(&self.orders);
            if let Some(slot) = orders.iter_mut().find(|o| o.id == order.id) {
                *slot = order.clone();
            }
            (!self.ack_only).then_some(order)
        }
    }

    impl OrderBackend for MockBackend {
        async fn fetch_columns(&self) -> Result<BoardColumns, ApiError> {
            Ok(BoardColumns::new(COLUMNS))
        }

        async fn fetch_board_orders(&self) -> Result<Vec<Pedido>, ApiError> {
            Ok(lock(&self.orders).clone())
        }

        async fn fetch_order(&self, id: &str) -> Result<Pedido, ApiError> {
            lock(&self.calls).push(format!("get {id}"));
            if self.fetch_fails {
                return Err(ApiError::from_status(503, "indisponível".into()));
            }
            self.find(id)
        }

        async fn update_status(
            &self,
            id: &str,
            update: &StatusUpdate,
        ) -> Result<Option<Pedido>, ApiError> {
            lock(&self.calls).push(format!("status {id} {} by {}", update.status, update.funcionario_nome));
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(ApiError::from_status(500, "boom".into()));
            }
            let mut order = self.find(id)?;
            order.status = update.status.clone();
            order.status_history.clear();
            Ok(self.commit(order))
        }

        async fn move_to_sector(
            &self,
            id: &str,
            body: &SectorMove,
        ) -> Result<Option<Pedido>, ApiError> {
            lock(&self.calls).push(format!("move {id} {} by {}", body.setor_id, body.funcionario_nome));
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(ApiError::from_status(500, "boom".into()));
            }
            let mut order = self.find(id)?;
            order.setor_atual = Some(body.setor_id);
            order.funcionario_atual = Some(body.funcionario_nome.clone());
            Ok(self.commit(order))
        }
    }

    fn order(id: &str) -> Pedido {
        let mut p = Pedido::new(id, "Lavagem - A Fazer");
        p.setores_fluxo = vec![
            SectorId::AtendimentoInicial,
            SectorId::Lavagem,
            SectorId::AtendimentoFinal,
        ];
        p
    }

    async fn tracker(backend: MockBackend) -> OrderTracker<MockBackend> {
        let tracker = OrderTracker::new(backend, SectorCatalog::default());
        tracker.refresh().await.unwrap();
        tracker
    }

    #[tokio::test]
    async fn refresh_loads_board() {
        let t = tracker(MockBackend::new(vec![order("1"), order("2")])).await;
        assert_eq!(t.columns().names().len(), 3);
        assert_eq!(t.orders().len(), 2);
    }

    #[tokio::test]
    async fn missing_actor_is_rejected_before_any_request() {
        let t = tracker(MockBackend::new(vec![order("1")])).await;

        let err = t.advance("1", "   ", None).await.unwrap_err();
        assert!(matches!(err, SapateiroError::Flow(FlowError::MissingActor)));
        let err = t
            .move_to_sector("1", SectorId::Lavagem, "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SapateiroError::Flow(FlowError::MissingActor)));
        let err = t
            .change_status("1", "Concluído", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SapateiroError::Flow(FlowError::MissingActor)));

        assert!(t.backend.calls().is_empty());
        assert_eq!(t.order("1").unwrap(), order("1"));
    }

    #[tokio::test]
    async fn advance_sends_next_sector_and_reconciles() {
        let t = tracker(MockBackend::new(vec![order("1")])).await;

        let report = t.advance("1", " Ana ", None).await.unwrap();
        assert_eq!(
            report.transition,
            SectorTransition::Moved {
                from: None,
                to: SectorId::AtendimentoInicial
            }
        );
        assert_eq!(t.backend.calls(), vec!["move 1 atendimento-inicial by Ana"]);
        assert_eq!(report.order.funcionario_atual.as_deref(), Some("Ana"));
        assert_eq!(t.order("1").unwrap(), report.order);
        assert!(!t.is_pending("1"));
    }

    #[tokio::test]
    async fn advance_from_last_sector_sends_nothing() {
        let mut last = order("1");
        last.setor_atual = Some(SectorId::AtendimentoFinal);
        let t = tracker(MockBackend::new(vec![last])).await;

        let report = t.advance("1", "Ana", None).await.unwrap();
        assert_eq!(
            report.transition,
            SectorTransition::Terminal {
                at: Some(SectorId::AtendimentoFinal)
            }
        );
        assert!(t.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn move_into_last_sector_reports_finalized() {
        let t = tracker(MockBackend::new(vec![order("1")])).await;
        let report = t
            .move_to_sector("1", SectorId::AtendimentoFinal, "Ana", Some("  "))
            .await
            .unwrap();
        assert!(matches!(
            report.transition,
            SectorTransition::Finalized {
                at: SectorId::AtendimentoFinal,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn failed_move_rolls_back_to_snapshot() {
        let t = tracker(MockBackend::new(vec![order("1")]).failing()).await;
        let before = t.order("1").unwrap();

        let err = t
            .move_to_sector("1", SectorId::Lavagem, "Ana", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SapateiroError::Api(ApiError::Status { status: 500, .. })));
        assert_eq!(t.order("1").unwrap(), before);
        assert!(!t.is_pending("1"));
    }

    #[tokio::test]
    async fn optimistic_state_is_visible_while_in_flight() {
        let t = tracker(MockBackend::new(vec![order("1")]).slow(Duration::from_millis(50))).await;

        let (report, seen) = tokio::join!(t.move_to_sector("1", SectorId::Lavagem, "Ana", None), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            (t.is_pending("1"), t.order("1").unwrap())
        });

        report.unwrap();
        let (pending, during) = seen;
        assert!(pending);
        assert_eq!(during.setor_atual, Some(SectorId::Lavagem));
        assert_eq!(during.setores_historico.entries().len(), 1);
    }

    #[tokio::test]
    async fn second_transition_on_same_order_is_rejected() {
        let t = tracker(
            MockBackend::new(vec![order("1"), order("2")]).slow(Duration::from_millis(30)),
        )
        .await;

        let (first, second, other) = tokio::join!(
            t.advance("1", "Ana", None),
            t.change_status("1", "Concluído", "Bia", None),
            t.advance("2", "Caio", None),
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(SapateiroError::TransitionPending(id)) if id == "1"));
        assert!(other.is_ok());
        assert_eq!(t.backend.calls().len(), 2);

        // Once the first transition settles the order accepts new ones.
        t.change_status("1", "Concluído", "Bia", None).await.unwrap();
    }

    #[tokio::test]
    async fn change_status_keeps_local_history_when_server_omits_it() {
        let t = tracker(MockBackend::new(vec![order("1")])).await;

        let updated = t
            .change_status("1", "Lavagem - Em Andamento", "Rui", Some("iniciado"))
            .await
            .unwrap();
        assert_eq!(updated.status, "Lavagem - Em Andamento");
        assert_eq!(updated.status_history.len(), 1);
        assert_eq!(updated.status_history[0].user_name.as_deref(), Some("Rui"));
        assert_eq!(t.order("1").unwrap().status, "Lavagem - Em Andamento");
    }

    #[tokio::test]
    async fn change_status_to_unknown_column_is_rejected() {
        let t = tracker(MockBackend::new(vec![order("1")])).await;
        let err = t
            .change_status("1", "Pintura - A Fazer", "Rui", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SapateiroError::Flow(FlowError::UnknownColumn(_))));
        assert!(t.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_status_change_rolls_back() {
        let t = tracker(MockBackend::new(vec![order("1")]).failing()).await;
        let err = t
            .change_status("1", "Concluído", "Rui", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SapateiroError::Api(_)));
        assert_eq!(t.order("1").unwrap(), order("1"));
    }

    #[tokio::test]
    async fn unknown_order_is_reported() {
        let t = tracker(MockBackend::new(vec![order("1")])).await;
        let err = t.advance("9", "Ana", None).await.unwrap_err();
        assert!(matches!(err, SapateiroError::OrderNotFound(id) if id == "9"));
        assert!(!t.is_pending("9"));
    }

    #[tokio::test]
    async fn reconcile_replaces_local_copy() {
        let t = tracker(MockBackend::new(vec![order("1")])).await;
        lock(&t.backend.orders)[0].status = "Concluído".into();

        let fresh = t.reconcile("1").await.unwrap();
        assert_eq!(fresh.status, "Concluído");
        assert_eq!(t.order("1").unwrap(), fresh);
    }

    #[tokio::test]
    async fn acknowledged_move_is_refetched() {
        let t = tracker(MockBackend::new(vec![order("1")]).acknowledging()).await;

        let report = t
            .move_to_sector("1", SectorId::Lavagem, "Ana", None)
            .await
            .unwrap();
        assert_eq!(t.backend.calls(), vec!["move 1 lavagem by Ana", "get 1"]);
        assert_eq!(report.order.setor_atual, Some(SectorId::Lavagem));
        // The refetched copy is the backend's, which carries no local history entry.
        assert!(report.order.setores_historico.entries().is_empty());
        assert_eq!(t.order("1").unwrap(), report.order);
        assert!(!t.is_pending("1"));
    }

    #[tokio::test]
    async fn acknowledged_move_keeps_optimistic_copy_when_refetch_fails() {
        let t = tracker(
            MockBackend::new(vec![order("1")])
                .acknowledging()
                .unreachable_on_refetch(),
        )
        .await;

        let report = t
            .move_to_sector("1", SectorId::Lavagem, "Ana", None)
            .await
            .unwrap();
        let local = t.order("1").unwrap();
        assert_eq!(local.setor_atual, Some(SectorId::Lavagem));
        assert_eq!(local.setores_historico.entries().len(), 1);
        assert_eq!(local, report.order);
    }

    #[tokio::test]
    async fn acknowledged_status_change_keeps_optimistic_copy_when_refetch_fails() {
        let t = tracker(
            MockBackend::new(vec![order("1")])
                .acknowledging()
                .unreachable_on_refetch(),
        )
        .await;

        let updated = t
            .change_status("1", "Concluído", "Rui", None)
            .await
            .unwrap();
        assert_eq!(t.backend.calls(), vec!["status 1 Concluído by Rui", "get 1"]);
        assert_eq!(updated.status, "Concluído");
        assert_eq!(updated.status_history.len(), 1);
        assert_eq!(t.order("1").unwrap(), updated);
    }

    mod over_http {
        use super::*;
        use crate::api::ApiClient;
        use serde_json::json;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        async fn board_server() -> MockServer {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/status/columns/filtered"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": {"Lavagem - A Fazer": [], "Concluído": []}
                })))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/pedidos/kanban/status"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                    {"id": "1", "status": "Lavagem - A Fazer",
                     "setoresFluxo": ["atendimento-inicial", "lavagem", "atendimento-final"]}
                ])))
                .mount(&server)
                .await;
            server
        }

        async fn tracker_for(server: &MockServer) -> OrderTracker<ApiClient> {
            let client = ApiClient::new(&server.uri(), Some("tok".into()), 5).unwrap();
            let tracker = OrderTracker::new(client, SectorCatalog::default());
            tracker.refresh().await.unwrap();
            tracker
        }

        #[tokio::test]
        async fn acknowledgement_only_status_patch_is_not_rolled_back() {
            let server = board_server().await;
            Mock::given(method("PATCH"))
                .and(path("/pedidos/1/status"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "success": true, "message": "Status atualizado"
                })))
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/pedidos/1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": {"id": "1", "status": "Concluído",
                             "statusHistory": [{"status": "Concluído", "date": "2025-05-02", "time": "10:00"}]}
                })))
                .expect(1)
                .mount(&server)
                .await;

            let t = tracker_for(&server).await;
            let updated = t.change_status("1", "Concluído", "Rui", None).await.unwrap();
            assert_eq!(updated.status, "Concluído");
            assert_eq!(updated.status_history[0].time, "10:00");
            assert_eq!(t.order("1").unwrap().status, "Concluído");
        }

        #[tokio::test]
        async fn acknowledgement_only_sector_post_is_not_rolled_back() {
            let server = board_server().await;
            Mock::given(method("POST"))
                .and(path("/pedidos/1/mover-setor"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/pedidos/1"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;

            let t = tracker_for(&server).await;
            let report = t.advance("1", "Ana", None).await.unwrap();
            assert_eq!(report.order.setor_atual, Some(SectorId::AtendimentoInicial));
            let local = t.order("1").unwrap();
            assert_eq!(local.setor_atual, Some(SectorId::AtendimentoInicial));
            assert_eq!(local.setores_historico.entries().len(), 1);
        }
    }

    #[test]
    fn pending_ticket_clears_on_drop() {
        let set = PendingSet::default();
        let ticket = set.try_begin("5").unwrap();
        assert!(set.contains("5"));
        assert!(set.try_begin("5").is_none());
        drop(ticket);
        assert!(!set.contains("5"));
        assert!(set.try_begin("5").is_some());
    }
}
