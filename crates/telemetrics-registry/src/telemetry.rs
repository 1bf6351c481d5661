//! Telemetry configuration and client: the owners of metric registries.
//!
//! A `TelemetryConfiguration` owns the registry shared by all its clients
//! (`AggregationScope::PerTelemetryConfiguration`). Each `TelemetryClient`
//! owns a private registry (`AggregationScope::PerTelemetryClient`). Both
//! registries use the configuration's default metric configuration.

use std::sync::Arc;

use telemetrics_core::error::{Result, TelemetryError};
use telemetrics_core::executor::exception_safe;
use telemetrics_core::{AggregationScope, MetricConfiguration, MetricIdentifier};

use crate::channel::TelemetryChannel;
use crate::metric::{Metric, MetricAggregate};
use crate::registry::MetricRegistry;

const FLUSH_MODULE: &str = "metrics";

#[derive(Clone)]
pub struct TelemetryConfiguration {
    inner: Arc<ConfigurationInner>,
}

struct ConfigurationInner {
    registry: Arc<MetricRegistry>,
    default_metric_configuration: MetricConfiguration,
    channel: Arc<dyn TelemetryChannel>,
}

impl TelemetryConfiguration {
    pub fn builder() -> TelemetryConfigurationBuilder {
        TelemetryConfigurationBuilder::default()
    }

    /// Registry shared by every client of this configuration.
    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn default_metric_configuration(&self) -> MetricConfiguration {
        self.inner.default_metric_configuration
    }

    pub fn channel(&self) -> Arc<dyn TelemetryChannel> {
        Arc::clone(&self.inner.channel)
    }

    /// Flush the shared registry into the channel. Channel failures are logged.
    pub fn flush(&self) {
        send_best_effort(self.inner.channel.as_ref(), &self.inner.registry.flush(), "flush_configuration");
    }
}

#[derive(Default)]
pub struct TelemetryConfigurationBuilder {
    default_metric_configuration: Option<MetricConfiguration>,
    channel: Option<Arc<dyn TelemetryChannel>>,
}

impl TelemetryConfigurationBuilder {
    pub fn default_metric_configuration(mut self, cfg: MetricConfiguration) -> Self {
        self.default_metric_configuration = Some(cfg);
        self
    }

    pub fn channel(mut self, channel: Arc<dyn TelemetryChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn build(self) -> Result<TelemetryConfiguration> {
        let channel = self.channel.ok_or(TelemetryError::NullArgument("channel"))?;
        let default_metric_configuration = self.default_metric_configuration.unwrap_or_default();
        Ok(TelemetryConfiguration {
            inner: Arc::new(ConfigurationInner {
                registry: Arc::new(MetricRegistry::new(default_metric_configuration)),
                default_metric_configuration,
                channel,
            }),
        })
    }
}

#[derive(Clone)]
pub struct TelemetryClient {
    configuration: TelemetryConfiguration,
    registry: Arc<MetricRegistry>,
}

impl TelemetryClient {
    pub fn new(configuration: &TelemetryConfiguration) -> Self {
        Self {
            configuration: configuration.clone(),
            registry: Arc::new(MetricRegistry::new(configuration.default_metric_configuration())),
        }
    }

    pub fn configuration(&self) -> &TelemetryConfiguration {
        &self.configuration
    }

    /// Registry backing lookups for `scope`.
    pub fn registry(&self, scope: AggregationScope) -> Arc<MetricRegistry> {
        match scope {
            AggregationScope::PerTelemetryConfiguration => self.configuration.registry(),
            AggregationScope::PerTelemetryClient => Arc::clone(&self.registry),
        }
    }

    /// Get or create a metric. `scope` defaults to `PerTelemetryConfiguration`.
    ///
    /// See [`MetricRegistry::get_or_create`] for the configuration rules.
    pub fn get_metric(
        &self,
        identifier: &MetricIdentifier,
        configuration: Option<&MetricConfiguration>,
        scope: Option<AggregationScope>,
    ) -> Result<Arc<Metric>> {
        self.registry(scope.unwrap_or_default())
            .get_or_create(identifier, configuration)
    }

    /// Flush the client-scoped registry into the configuration's channel.
    pub fn flush(&self) {
        send_best_effort(
            self.configuration.inner.channel.as_ref(),
            &self.registry.flush(),
            "flush_client",
        );
    }
}

fn send_best_effort(channel: &dyn TelemetryChannel, batch: &[MetricAggregate], activity: &str) {
    if batch.is_empty() {
        return;
    }
    exception_safe(FLUSH_MODULE, activity, || channel.send(batch));
}
