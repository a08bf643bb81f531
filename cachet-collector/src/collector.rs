//! The Cachet collector: one scrape of the status page, translated into
//! gauges.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use cachet_client::{ClientError, StatusSource};
use cachet_types::{ComponentGroup, ComponentStatus, Incident, IncidentStatus, MetricSample};

use crate::desc::{build_fq_name, Desc};

const NAMESPACE: &str = "cachet";

/// Buffer between a collector and whoever drains it in [`collect_to_vec`].
const SAMPLE_BUFFER: usize = 64;

/// Something that can describe and produce metric samples.
#[async_trait]
pub trait Collector: Send + Sync {
    /// The static set of metric families this collector can produce.
    ///
    /// Called once at registration time.
    fn describe(&self) -> Vec<Desc>;

    /// Produce one full set of samples into `sink`, as they are computed.
    ///
    /// If the receiving side goes away, the collector stops early.
    async fn collect(&self, sink: &mpsc::Sender<MetricSample>);
}

/// Run a collector to completion and gather everything it emits.
pub async fn collect_to_vec(collector: &dyn Collector) -> Vec<MetricSample> {
    let (tx, mut rx) = mpsc::channel(SAMPLE_BUFFER);
    let mut samples = Vec::new();

    let produce = async move {
        collector.collect(&tx).await;
    };
    let consume = async {
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }
    };
    tokio::join!(produce, consume);

    samples
}

/// The fixed metric schema of the Cachet exporter.
///
/// Built once when the collector is created and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Descriptors {
    pub up: Desc,
    pub scrape_duration: Desc,
    pub incidents: Desc,
    pub components: Desc,
}

impl Descriptors {
    fn new() -> Self {
        Self {
            up: Desc::new(
                build_fq_name(NAMESPACE, "", "up"),
                "Cachet API is up and accepting requests",
                &[],
            ),
            scrape_duration: Desc::new(
                build_fq_name(NAMESPACE, "", "scrape_duration_seconds"),
                "Time Cachet scrape took in seconds",
                &[],
            ),
            incidents: Desc::new(
                build_fq_name(NAMESPACE, "", "incidents"),
                "Number of incidents by status",
                &["status", "group_name", "component_name"],
            ),
            components: Desc::new(
                build_fq_name(NAMESPACE, "", "components"),
                "Number of components by status",
                &["status", "group_name"],
            ),
        }
    }

    /// All descriptors, in a stable order.
    pub fn all(&self) -> Vec<Desc> {
        vec![
            self.up.clone(),
            self.scrape_duration.clone(),
            self.incidents.clone(),
            self.components.clone(),
        ]
    }
}

/// Returned internally when the sample receiver has been dropped.
#[derive(Debug)]
struct SinkClosed;

async fn emit(sink: &mpsc::Sender<MetricSample>, sample: MetricSample) -> Result<(), SinkClosed> {
    sink.send(sample).await.map_err(|_| SinkClosed)
}

/// Exports the state of a Cachet status page.
///
/// Scrapes are serialized: a second caller waits for the one in flight and
/// then runs its own full scrape.
#[derive(Debug)]
pub struct CachetCollector {
    source: Arc<dyn StatusSource>,
    descs: Descriptors,
    scrape_lock: Mutex<()>,
}

impl CachetCollector {
    /// Create a collector reading from `source`.
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self {
            source,
            descs: Descriptors::new(),
            scrape_lock: Mutex::new(()),
        }
    }

    /// The metric schema this collector emits.
    pub fn descriptors(&self) -> &Descriptors {
        &self.descs
    }

    async fn scrape(
        &self,
        sink: &mpsc::Sender<MetricSample>,
        start: Instant,
    ) -> Result<(), SinkClosed> {
        match self.source.ping_health().await {
            Ok(true) => {}
            Ok(false) => {
                error!("failed to scrape Cachet: ping did not answer Pong");
                return emit(sink, self.descs.up.sample(0.0, &[])).await;
            }
            Err(err) => {
                log_fetch_error(&err, "ping");
                return emit(sink, self.descs.up.sample(0.0, &[])).await;
            }
        }

        let groups = match self.source.fetch_component_groups().await {
            Ok(groups) => groups,
            Err(err) => {
                log_fetch_error(&err, "component groups");
                return emit(sink, self.descs.up.sample(0.0, &[])).await;
            }
        };

        let mut degraded = false;
        let mut incidents = Vec::with_capacity(IncidentStatus::ALL.len());
        for status in IncidentStatus::ALL {
            match self.source.fetch_incidents_by_status(status).await {
                Ok(list) => incidents.push((status, list)),
                Err(err) => {
                    log_fetch_error(&err, status.name());
                    degraded = true;
                    incidents.push((status, Vec::new()));
                }
            }
        }

        for group in &groups {
            self.emit_incidents(sink, group, &incidents).await?;
        }
        for group in &groups {
            self.emit_components(sink, group).await?;
        }

        debug!(
            groups = groups.len(),
            degraded, "finished aggregating Cachet state"
        );

        let up = if degraded { 0.0 } else { 1.0 };
        emit(sink, self.descs.up.sample(up, &[])).await?;
        emit(
            sink,
            self.descs
                .scrape_duration
                .sample(start.elapsed().as_secs_f64(), &[]),
        )
        .await
    }

    async fn emit_incidents(
        &self,
        sink: &mpsc::Sender<MetricSample>,
        group: &ComponentGroup,
        incidents: &[(IncidentStatus, Vec<Incident>)],
    ) -> Result<(), SinkClosed> {
        for component in &group.components {
            for (status, list) in incidents {
                let count = list
                    .iter()
                    .filter(|i| i.status == *status && i.affects(component))
                    .count();
                let code = status.code().to_string();
                emit(
                    sink,
                    self.descs.incidents.sample(
                        count as f64,
                        &[code.as_str(), group.name.as_str(), component.name.as_str()],
                    ),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn emit_components(
        &self,
        sink: &mpsc::Sender<MetricSample>,
        group: &ComponentGroup,
    ) -> Result<(), SinkClosed> {
        for status in ComponentStatus::ALL {
            let code = status.code().to_string();
            emit(
                sink,
                self.descs.components.sample(
                    group.count_with_status(status) as f64,
                    &[code.as_str(), group.name.as_str()],
                ),
            )
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Collector for CachetCollector {
    fn describe(&self) -> Vec<Desc> {
        self.descs.all()
    }

    async fn collect(&self, sink: &mpsc::Sender<MetricSample>) {
        // To protect metrics from concurrent collects.
        let _guard = self.scrape_lock.lock().await;

        let start = Instant::now();
        info!("Collecting metrics from Cachet");

        if self.scrape(sink, start).await.is_err() {
            debug!("sample receiver dropped, abandoning scrape");
        }
    }
}

fn log_fetch_error(err: &ClientError, what: &str) {
    if err.is_transport() {
        error!(error = %err, kind = err.kind(), fetch = what, "failed to reach Cachet");
    } else {
        warn!(error = %err, kind = err.kind(), fetch = what, "Cachet returned an unusable response");
    }
}
