use std::sync::Arc;

use crate::{config::Config, domain_events::WebDomainEventSink};
use freightfin_core::{
    config::LedgerConfig,
    events::DomainEventSink,
    fees::{PlatformFeeService, PlatformFeeServiceTrait},
    investments::InvestmentRepositoryTrait,
    lifecycle::LifecycleCoordinator,
    trips::{TripService, TripServiceTrait},
    unit_of_work::UnitOfWork,
    wallets::{LedgerRepositoryTrait, WalletService, WalletServiceTrait},
};
use freightfin_storage_sqlite::{
    db, InvestmentRepository, LedgerRepository, PlatformFeeRepository, SqliteUnitOfWork,
    TripRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub ledger_config: LedgerConfig,
    pub wallet_service: Arc<dyn WalletServiceTrait>,
    pub ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    pub trip_service: Arc<dyn TripServiceTrait>,
    pub investment_repository: Arc<dyn InvestmentRepositoryTrait>,
    pub platform_fee_service: Arc<dyn PlatformFeeServiceTrait>,
    pub coordinator: Arc<LifecycleCoordinator>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());
    let unit_of_work: Arc<dyn UnitOfWork> = Arc::new(SqliteUnitOfWork::new(writer));

    let domain_event_sink = Arc::new(WebDomainEventSink::new());
    domain_event_sink.start_worker();
    let event_sink: Arc<dyn DomainEventSink> = domain_event_sink;

    let ledger_config = config.ledger.clone();
    let retries = ledger_config.max_conflict_retries;

    let ledger_repository: Arc<dyn LedgerRepositoryTrait> =
        Arc::new(LedgerRepository::new(pool.clone()));
    let wallet_service = Arc::new(WalletService::new(
        unit_of_work.clone(),
        ledger_repository.clone(),
        retries,
    ));

    let trip_service = Arc::new(TripService::new(
        unit_of_work.clone(),
        Arc::new(TripRepository::new(pool.clone())),
        event_sink.clone(),
        retries,
    ));

    let investment_repository = Arc::new(InvestmentRepository::new(pool.clone()));
    let platform_fee_service = Arc::new(PlatformFeeService::new(Arc::new(
        PlatformFeeRepository::new(pool.clone()),
    )));

    let coordinator = Arc::new(LifecycleCoordinator::new(
        unit_of_work,
        event_sink,
        ledger_config.clone(),
    ));

    Ok(Arc::new(AppState {
        ledger_config,
        wallet_service,
        ledger_repository,
        trip_service,
        investment_repository,
        platform_fee_service,
        coordinator,
    }))
}
