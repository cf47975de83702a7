//! Execução dos subcomandos da CLI.

use std::time::Duration;

use chrono::Utc;
use console::Term;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, Funcionario};
use crate::board::{BoardProjection, QuickOutcome, QuickTarget, find_order, resolve_quick};
use crate::cli::Command;
use crate::config::SapateiroConfig;
use crate::dashboard::{overdue_orders, summarize};
use crate::error::SapateiroError;
use crate::flow::{Actor, SectorCatalog, SectorId};
use crate::session::Session;
use crate::tracker::OrderTracker;
use crate::ui::{self, Spinner};

/// Runs one CLI command against the configured backend.
pub async fn run(command: Command, mut config: SapateiroConfig) -> Result<(), SapateiroError> {
    let client = ApiClient::new(&config.api_url, config.token(), config.timeout_secs)?;
    let interval = Duration::from_secs(config.poll_interval_secs.max(1));

    match command {
        Command::Login { email, password } => login(&client, &mut config, &email, password).await,
        _ if config.token().is_none() => Err(SapateiroError::NotLoggedIn),
        Command::Board { watch } => board(client, config.token(), watch, interval).await,
        Command::Progress { pedido } => progress(&client, &pedido).await,
        Command::Advance {
            pedido,
            funcionario,
            observacao,
        } => advance(client, &pedido, None, &funcionario, observacao.as_deref()).await,
        Command::Move {
            pedido,
            setor,
            funcionario,
            observacao,
        } => advance(client, &pedido, Some(setor), &funcionario, observacao.as_deref()).await,
        Command::Status {
            pedido,
            status,
            funcionario,
            observacao,
        } => change_status(client, &pedido, &status, &funcionario, observacao.as_deref()).await,
        Command::Quick {
            query,
            to,
            funcionario,
        } => quick(client, config.token(), &query, &to, &funcionario).await,
        Command::Setores { watch } => sectors(&client, watch, interval).await,
        Command::Atrasados => overdue(&client).await,
        Command::Funcionarios {
            setor,
            ativos,
            inativos,
        } => {
            let ativo = match (ativos, inativos) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            employees(&client, setor.as_deref(), ativo).await
        }
    }
}

/// Sleeps until the next poll. `false` once Ctrl-C is pressed.
async fn wait_next(interval: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(interval) => true,
        _ = tokio::signal::ctrl_c() => {
            info!("watch stopped");
            false
        }
    }
}

async fn login(
    client: &ApiClient,
    config: &mut SapateiroConfig,
    email: &str,
    password: Option<String>,
) -> Result<(), SapateiroError> {
    let password = match password {
        Some(p) => p,
        None => {
            eprint!("Senha: ");
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let spinner = Spinner::start("Entrando...");
    let result = client.login(email.trim(), &password).await;
    spinner.finish();

    // 401 aqui é credencial errada, não sessão expirada.
    let token = result.map_err(|err| match err {
        ApiError::SessionExpired(message) => ApiError::Status {
            status: 401,
            message,
        },
        other => other,
    })?;
    config
        .save_token(&token)
        .map_err(|e| SapateiroError::Config(e.to_string()))?;
    info!(email = email.trim(), "logged in");
    println!("  Login realizado. Token salvo em {}", config.token_file.display());
    Ok(())
}

async fn board(
    client: ApiClient,
    token: Option<String>,
    watch: bool,
    interval: Duration,
) -> Result<(), SapateiroError> {
    let session = Session::resolve(&client, token).await;
    if !session.is_authenticated() {
        return Err(SapateiroError::NotLoggedIn);
    }
    let tracker = OrderTracker::new(client, SectorCatalog::default());

    loop {
        match tracker.refresh().await {
            Ok(()) => {
                if watch {
                    Term::stdout().clear_screen()?;
                }
                let columns = tracker.columns();
                let orders = tracker.orders();
                let projection = BoardProjection::build(&columns, &orders, &session.user);
                ui::print_board(&projection, &session.user);
            }
            Err(err) if watch => {
                warn!(error = %err, "board refresh failed");
                ui::print_error(&err);
            }
            Err(err) => return Err(err),
        }
        if !watch || !wait_next(interval).await {
            return Ok(());
        }
    }
}

async fn progress(client: &ApiClient, id: &str) -> Result<(), SapateiroError> {
    let catalog = SectorCatalog::default();
    let spinner = Spinner::start("Carregando pedido...");
    let result = tokio::try_join!(client.get_order(id), client.next_sector(id));
    spinner.finish();

    let (order, next) = result?;
    let stages = order.progress(&catalog)?;
    ui::print_progress(&order, &stages, &catalog);
    match next {
        Some(next) => println!("  Próximo setor: {}", catalog.name(next.id)),
        None => println!("  Último setor do fluxo"),
    }
    Ok(())
}

/// Advances the order, or moves it to `target` when given.
async fn advance(
    client: ApiClient,
    id: &str,
    target: Option<SectorId>,
    funcionario: &str,
    observacao: Option<&str>,
) -> Result<(), SapateiroError> {
    Actor::new(funcionario)?;
    let tracker = OrderTracker::new(client, SectorCatalog::default());

    let spinner = Spinner::start("Movendo pedido...");
    let result = async {
        tracker.reconcile(id).await?;
        match target {
            Some(sector) => {
                tracker
                    .move_to_sector(id, sector, funcionario, observacao)
                    .await
            }
            None => tracker.advance(id, funcionario, observacao).await,
        }
    }
    .await;
    spinner.finish();

    let report = result?;
    ui::print_transition(&report, tracker.catalog());
    Ok(())
}

async fn change_status(
    client: ApiClient,
    id: &str,
    status: &str,
    funcionario: &str,
    observacao: Option<&str>,
) -> Result<(), SapateiroError> {
    Actor::new(funcionario)?;
    let tracker = OrderTracker::new(client, SectorCatalog::default());

    let spinner = Spinner::start("Atualizando status...");
    let result = async {
        tracker.refresh().await?;
        if tracker.order(id).is_none() {
            tracker.reconcile(id).await?;
        }
        tracker
            .change_status(id, status, funcionario, observacao)
            .await
    }
    .await;
    spinner.finish();

    let order = result?;
    ui::print_status_change(&order, &format!("movido para {status}"));
    Ok(())
}

async fn quick(
    client: ApiClient,
    token: Option<String>,
    query: &str,
    to: &str,
    funcionario: &str,
) -> Result<(), SapateiroError> {
    Actor::new(funcionario)?;
    let Ok(target) = to.parse::<QuickTarget>();
    let session = Session::resolve(&client, token).await;
    let tracker = OrderTracker::new(client, SectorCatalog::default());
    tracker.refresh().await?;

    let orders = tracker.orders();
    let order =
        find_order(&orders, query).ok_or_else(|| SapateiroError::OrderNotFound(query.to_string()))?;

    match resolve_quick(&tracker.columns(), &session.user, order, &target) {
        QuickOutcome::Move { status, action } => {
            let updated = tracker
                .change_status(&order.id, &status, funcionario, None)
                .await?;
            ui::print_status_change(&updated, &action);
            Ok(())
        }
        QuickOutcome::AlreadyFinal => {
            println!("  Pedido #{} já está na etapa final", order.display_code());
            Ok(())
        }
        QuickOutcome::NoTarget(name) => {
            let sectors: Vec<&str> = tracker
                .columns()
                .available_sectors()
                .into_iter()
                .map(|(keyword, _)| keyword)
                .collect();
            eprintln!("  Setores disponíveis: next, prev, {}", sectors.join(", "));
            Err(SapateiroError::NoQuickTarget(name))
        }
    }
}

async fn sectors(client: &ApiClient, watch: bool, interval: Duration) -> Result<(), SapateiroError> {
    loop {
        match client.sector_statistics().await {
            Ok(stats) => {
                if watch {
                    Term::stdout().clear_screen()?;
                }
                ui::print_statistics(&stats);
            }
            Err(err) if watch => ui::print_error(&err.into()),
            Err(err) => return Err(err.into()),
        }
        if !watch || !wait_next(interval).await {
            return Ok(());
        }
    }
}

async fn overdue(client: &ApiClient) -> Result<(), SapateiroError> {
    let spinner = Spinner::start("Carregando pedidos...");
    let result = client.list_orders().await;
    spinner.finish();

    let orders = result?;
    ui::print_overdue(&overdue_orders(&orders, Utc::now()), &summarize(&orders));
    Ok(())
}

async fn employees(
    client: &ApiClient,
    setor: Option<&str>,
    ativo: Option<bool>,
) -> Result<(), SapateiroError> {
    let list = client.employees().await?;
    ui::print_employees(&filter_employees(list, setor, ativo));
    Ok(())
}

pub fn filter_employees(
    list: Vec<Funcionario>,
    setor: Option<&str>,
    ativo: Option<bool>,
) -> Vec<Funcionario> {
    list.into_iter()
        .filter(|f| setor.is_none_or(|s| f.setor_id.as_deref() == Some(s)))
        .filter(|f| ativo.is_none_or(|a| f.ativo == a))
        .collect()
}
