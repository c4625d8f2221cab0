use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    pub registry: Registry,
    pub login_attempts: IntCounterVec,
    pub lockout_rejections: IntCounter,
    pub tracked_attempts: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let login_attempts = IntCounterVec::new(
            prometheus::Opts::new("login_attempts_total", "Login attempts grouped by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(login_attempts.clone()))?;

        let lockout_rejections = IntCounter::new(
            "login_lockout_rejections_total",
            "Login attempts rejected by the sliding-window lockout",
        )?;
        registry.register(Box::new(lockout_rejections.clone()))?;

        let tracked_attempts = IntGauge::new(
            "login_tracked_attempts",
            "Attempts currently inside the lockout window",
        )?;
        registry.register(Box::new(tracked_attempts.clone()))?;

        Ok(Self {
            registry,
            login_attempts,
            lockout_rejections,
            tracked_attempts,
        })
    }

    pub fn record_login(&self, outcome: &str, recent_attempts: usize) {
        self.login_attempts.with_label_values(&[outcome]).inc();
        self.tracked_attempts.set(recent_attempts as i64);
    }

    pub fn render(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&metric_families, &mut buffer).map_err(|e| e.to_string())?;
        String::from_utf8(buffer).map_err(|e| e.to_string())
    }
}
