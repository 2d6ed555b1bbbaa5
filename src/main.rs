// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use axum::{routing::get, Router};
use futures::StreamExt;
use k8s_openapi::api::core::v1::{Namespace, Secret, ServiceAccount};
use kube::{
    runtime::{watcher, watcher::Event as WatchEvent},
    Api, Client, ResourceExt,
};
use kube_lease_manager::{LeaseManager, LeaseManagerBuilder};
use std::sync::Arc;
use svidctl::ca::rcgen_ca::{RcgenCertificateAuthority, RootConfig};
use svidctl::ca::CertificateAuthority;
use svidctl::cluster_api::{ClusterApi, KubeClusterApi};
use svidctl::config::ControllerConfig;
use svidctl::constants::{
    DEFAULT_LEASE_DURATION_SECS, DEFAULT_LEASE_RENEW_DEADLINE_SECS,
    DEFAULT_LEASE_RETRY_PERIOD_SECS, EVENT_QUEUE_CAPACITY, METRICS_SERVER_BIND_ADDRESS,
    METRICS_SERVER_PATH, METRICS_SERVER_PORT, TOKIO_WORKER_THREADS,
};
use svidctl::event::Event;
use svidctl::reconciler::Reconciler;
use svidctl::{metrics, scheduler};
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("svidctl-worker")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initializes logging, honoring `RUST_LOG` for level filtering and
/// `RUST_LOG_FORMAT` (`json` or `text`) for output shape.
fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting svidctl workload-identity secret controller");
}

/// Initializes the Kubernetes client, honoring `SVIDCTL_KUBE_QPS`/`SVIDCTL_KUBE_BURST`
/// overrides the way the rest of this crate's settings are loaded.
async fn build_client() -> Result<Client> {
    let config = kube::Config::infer().await?;
    let client = Client::try_from(config)?;
    debug!("Kubernetes client initialized");
    Ok(client)
}

/// Builds and initializes the default self-signed CA (supplemental
/// concrete `RcgenCertificateAuthority`). A production deployment backed by
/// a real CA would swap this out behind the same [`CertificateAuthority`]
/// trait without touching any other module.
fn build_certificate_authority() -> Result<Arc<dyn CertificateAuthority>> {
    let ca = RcgenCertificateAuthority::new(RootConfig::default());
    ca.init().context("failed to initialize self-signed root CA")?;
    Ok(Arc::new(ca))
}

/// Starts the Prometheus metrics HTTP server, so failures that manifest as
/// stale or missing secrets stay observable.
fn start_metrics_server() -> tokio::task::JoinHandle<()> {
    info!(
        bind_address = METRICS_SERVER_BIND_ADDRESS,
        port = METRICS_SERVER_PORT,
        path = METRICS_SERVER_PATH,
        "Starting Prometheus metrics HTTP server"
    );

    tokio::spawn(async move {
        async fn metrics_handler() -> String {
            match metrics::gather_metrics() {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to gather metrics: {e}");
                    String::from("# Error gathering metrics\n")
                }
            }
        }

        let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));
        let bind_addr = format!("{METRICS_SERVER_BIND_ADDRESS}:{METRICS_SERVER_PORT}");
        let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind metrics server to {bind_addr}: {e}");
                return;
            }
        };

        info!("Metrics server listening on http://{bind_addr}{METRICS_SERVER_PATH}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {e}");
        }
    })
}

/// Leader election configuration, loaded from `SVIDCTL_*` environment
/// variables.
struct LeaderElectionConfig {
    enabled: bool,
    lease_name: String,
    lease_namespace: String,
    identity: String,
    lease_duration: u64,
    renew_deadline: u64,
    retry_period: u64,
}

fn load_leader_election_config(ca_storage_namespace: &str) -> LeaderElectionConfig {
    let enabled = std::env::var("SVIDCTL_ENABLE_LEADER_ELECTION")
        .unwrap_or_else(|_| "true".to_string())
        .parse::<bool>()
        .unwrap_or(true);

    let lease_name =
        std::env::var("SVIDCTL_LEASE_NAME").unwrap_or_else(|_| "svidctl-leader".to_string());

    let lease_namespace = std::env::var("SVIDCTL_LEASE_NAMESPACE")
        .or_else(|_| std::env::var("POD_NAMESPACE"))
        .unwrap_or_else(|_| ca_storage_namespace.to_string());

    let lease_duration = std::env::var("SVIDCTL_LEASE_DURATION_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_LEASE_DURATION_SECS);

    let renew_deadline = std::env::var("SVIDCTL_LEASE_RENEW_DEADLINE_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_LEASE_RENEW_DEADLINE_SECS);

    let retry_period = std::env::var("SVIDCTL_LEASE_RETRY_PERIOD_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_LEASE_RETRY_PERIOD_SECS);

    let identity = std::env::var("POD_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| format!("svidctl-{}", rand::random::<u32>()));

    LeaderElectionConfig {
        enabled,
        lease_name,
        lease_namespace,
        identity,
        lease_duration,
        renew_deadline,
        retry_period,
    }
}

/// Lists the namespace `Api` handles to watch. An empty configured list is
/// the cluster-wide sentinel: watch everything via a single `None` handle.
fn target_namespaces(config: &ControllerConfig) -> Vec<Option<String>> {
    if config.watched_namespaces.is_empty() {
        vec![None]
    } else {
        config
            .watched_namespaces
            .iter()
            .map(|ns| Some(ns.clone()))
            .collect()
    }
}

fn service_accounts_api(client: &Client, namespace: &Option<String>) -> Api<ServiceAccount> {
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

fn secrets_api(client: &Client, namespace: &Option<String>) -> Api<Secret> {
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

/// Spawns the three watch streams (identity, namespace, secret) as
/// producers into one bounded channel consumed by the single worker, so
/// reconciliation is fully serialized and needs no per-key locking.
fn spawn_watchers(client: Client, config: &ControllerConfig, tx: tokio::sync::mpsc::Sender<Event>) {
    for namespace in target_namespaces(config) {
        let client = client.clone();
        let tx = tx.clone();
        let namespace_label = namespace.clone();
        tokio::spawn(async move {
            let api = service_accounts_api(&client, &namespace);
            let mut stream = watcher(api, watcher::Config::default()).boxed();
            while let Some(event) = stream.next().await {
                match event {
                    Ok(WatchEvent::Apply(sa) | WatchEvent::InitApply(sa)) => {
                        let identity = svidctl::identity::Identity::new(
                            sa.name_any(),
                            sa.namespace().unwrap_or_default(),
                        );
                        let _ = tx.send(Event::IdentityAdded(identity)).await;
                    }
                    Ok(WatchEvent::Delete(sa)) => {
                        let identity = svidctl::identity::Identity::new(
                            sa.name_any(),
                            sa.namespace().unwrap_or_default(),
                        );
                        let _ = tx.send(Event::IdentityDeleted(identity)).await;
                    }
                    Ok(WatchEvent::Init | WatchEvent::InitDone) => {}
                    Err(e) => warn!(namespace = ?namespace_label, error = %e, "identity watch error"),
                }
            }
            warn!(namespace = ?namespace_label, "identity watcher stream ended");
        });
    }

    {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let api: Api<Namespace> = Api::all(client);
            let mut stream = watcher(api, watcher::Config::default()).boxed();
            while let Some(event) = stream.next().await {
                match event {
                    Ok(WatchEvent::Apply(ns) | WatchEvent::InitApply(ns)) => {
                        let name = ns.name_any();
                        let labels = ns.labels().clone();
                        let _ = tx.send(Event::NamespaceObserved { name, labels }).await;
                    }
                    Ok(WatchEvent::Delete(_) | WatchEvent::Init | WatchEvent::InitDone) => {}
                    Err(e) => warn!(error = %e, "namespace watch error"),
                }
            }
            warn!("namespace watcher stream ended");
        });
    }

    for namespace in target_namespaces(config) {
        let client = client.clone();
        let tx = tx.clone();
        let namespace_label = namespace.clone();
        tokio::spawn(async move {
            let api = secrets_api(&client, &namespace);
            let mut stream = watcher(api, watcher::Config::default()).boxed();
            while let Some(event) = stream.next().await {
                match event {
                    Ok(WatchEvent::Apply(secret) | WatchEvent::InitApply(secret)) => {
                        let _ = tx.send(Event::SecretObserved(secret)).await;
                    }
                    Ok(WatchEvent::Delete(secret)) => {
                        let namespace = secret.namespace().unwrap_or_default();
                        let name = secret.name_any();
                        let type_tag = secret.type_.clone();
                        let _ = tx
                            .send(Event::SecretDeleted {
                                namespace,
                                name,
                                type_tag,
                            })
                            .await;
                    }
                    Ok(WatchEvent::Init | WatchEvent::InitDone) => {}
                    Err(e) => warn!(namespace = ?namespace_label, error = %e, "secret watch error"),
                }
            }
            warn!(namespace = ?namespace_label, "secret watcher stream ended");
        });
    }
}

/// Performs the startup relist pass: controller state is not persisted
/// across restarts, so this lists every watched namespace once and feeds
/// it through the reconciler as if freshly observed. Since the
/// reconciler's managed-state side-table starts empty on every process
/// start, any namespace found managed here naturally triggers the same
/// back-fill path as a live `false -> true` transition.
async fn perform_startup_relist(
    client: &Client,
    config: &ControllerConfig,
    reconciler: &mut Reconciler,
) -> Result<()> {
    info!("Performing startup relist of namespaces for drift detection");
    let namespaces_api: Api<Namespace> = Api::all(client.clone());

    let namespaces: Vec<Namespace> = if config.watched_namespaces.is_empty() {
        namespaces_api
            .list(&kube::api::ListParams::default())
            .await
            .context("failed to list namespaces for startup relist")?
            .items
    } else {
        let mut namespaces = Vec::with_capacity(config.watched_namespaces.len());
        for name in &config.watched_namespaces {
            match namespaces_api.get(name).await {
                Ok(ns) => namespaces.push(ns),
                Err(e) => warn!(namespace = %name, error = %e, "failed to fetch watched namespace"),
            }
        }
        namespaces
    };

    info!(count = namespaces.len(), "Startup relist found namespaces");
    for namespace in namespaces {
        let name = namespace.name_any();
        let labels = namespace.labels().clone();
        reconciler
            .dispatch(Event::NamespaceObserved { name, labels })
            .await;
    }

    Ok(())
}

/// Runs the consumer loop: the single logical worker that drains the
/// event channel and the scheduler's timer tick.
async fn run_event_loop(
    mut reconciler: Reconciler,
    mut events: tokio::sync::mpsc::Receiver<Event>,
) -> Result<()> {
    let interval = reconciler.config().scheduler_interval();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                match maybe_event {
                    Some(event) => reconciler.dispatch(event).await,
                    None => {
                        warn!("event channel closed, all watchers have exited");
                        anyhow::bail!("event channel closed");
                    }
                }
            }
            _ = ticker.tick() => {
                debug!("scheduler tick");
                scheduler::run_pass(&mut reconciler).await;
            }
        }
    }
}

async fn wait_for_sigterm() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        sigterm.recv().await;
        Ok(())
    }
    #[cfg(not(unix))]
    {
        std::future::pending::<()>().await;
        Ok(())
    }
}

async fn monitor_leadership(mut leader_rx: tokio::sync::watch::Receiver<bool>) -> Result<()> {
    loop {
        leader_rx.changed().await?;
        if !*leader_rx.borrow() {
            return Ok(());
        }
    }
}

async fn async_main() -> Result<()> {
    initialize_logging();

    let client = build_client().await?;
    let config = ControllerConfig::from_env()?;
    let ca = build_certificate_authority()?;
    let cluster: Arc<dyn ClusterApi> = Arc::new(KubeClusterApi::new(client.clone()));

    let _metrics_handle = start_metrics_server();
    let leader_config = load_leader_election_config(&config.ca_storage_namespace);

    let (tx, rx) = tokio::sync::mpsc::channel::<Event>(EVENT_QUEUE_CAPACITY);
    let mut reconciler = Reconciler::new(config.clone(), ca, cluster)?;

    if leader_config.enabled {
        info!(
            lease_name = %leader_config.lease_name,
            lease_namespace = %leader_config.lease_namespace,
            identity = %leader_config.identity,
            "Leader election enabled, waiting to acquire leadership..."
        );

        let lease_manager =
            LeaseManagerBuilder::new(client.clone(), &leader_config.lease_name)
                .with_namespace(&leader_config.lease_namespace)
                .with_identity(&leader_config.identity)
                .with_duration(leader_config.lease_duration)
                .with_grace(leader_config.retry_period)
                .build()
                .await?;

        let (leader_rx, lease_handle) = lease_manager.watch().await;
        let mut rx_watch = leader_rx.clone();
        while !*rx_watch.borrow_and_update() {
            rx_watch.changed().await?;
        }
        metrics::record_leader_status(&leader_config.identity, true);
        info!("Leadership acquired, starting reconciliation");

        if let Err(e) = perform_startup_relist(&client, &config, &mut reconciler).await {
            warn!(error = %e, "startup relist failed, continuing without it");
        }

        spawn_watchers(client.clone(), &config, tx);
        run_event_loop_with_leadership(reconciler, rx, leader_rx, lease_handle).await
    } else {
        info!("Leader election disabled, starting reconciliation immediately");

        if let Err(e) = perform_startup_relist(&client, &config, &mut reconciler).await {
            warn!(error = %e, "startup relist failed, continuing without it");
        }

        spawn_watchers(client.clone(), &config, tx);

        let shutdown_result: Result<()> = tokio::select! {
            result = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, initiating graceful shutdown...");
                result.map_err(anyhow::Error::from)
            }
            result = wait_for_sigterm() => {
                info!("Received SIGTERM, initiating graceful shutdown...");
                result
            }
            result = run_event_loop(reconciler, rx) => result,
        };
        shutdown_result?;
        info!("Graceful shutdown completed");
        Ok(())
    }
}

async fn run_event_loop_with_leadership(
    reconciler: Reconciler,
    events: tokio::sync::mpsc::Receiver<Event>,
    leader_rx: tokio::sync::watch::Receiver<bool>,
    _lease_handle: tokio::task::JoinHandle<
        Result<LeaseManager, kube_lease_manager::LeaseManagerError>,
    >,
) -> Result<()> {
    let shutdown_result: Result<()> = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, initiating graceful shutdown...");
            result.map_err(anyhow::Error::from)
        }
        result = wait_for_sigterm() => {
            info!("Received SIGTERM, initiating graceful shutdown...");
            result
        }
        result = monitor_leadership(leader_rx) => {
            warn!("Leadership lost! Stepping down...");
            result.and_then(|()| anyhow::bail!("leadership lost"))
        }
        result = run_event_loop(reconciler, events) => result,
    };

    shutdown_result?;
    info!("Graceful shutdown completed, leader election lease released");
    Ok(())
}
