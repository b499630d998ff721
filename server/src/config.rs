use billiards_shared::config::SimConfig;

/// Idle shooter settings
#[derive(Debug, Clone)]
pub struct AutoplayConfig {
    pub enabled: bool,
    /// Seconds without viewer input before a shot is taken
    pub idle_secs: f64,
    /// Charge duration range in ticks (inclusive)
    pub min_charge_ticks: u32,
    pub max_charge_ticks: u32,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_secs: 8.0,
            min_charge_ticks: 40,  // strength 0.01
            max_charge_ticks: 400, // strength 0.1, the limit
        }
    }
}

impl AutoplayConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.idle_secs.is_finite() || self.idle_secs < 0.0 {
            return Err(format!(
                "autoplay idle_secs must be non-negative, got {}",
                self.idle_secs
            ));
        }
        if self.min_charge_ticks == 0 {
            return Err("autoplay min_charge_ticks must be > 0".to_string());
        }
        if self.min_charge_ticks > self.max_charge_ticks {
            return Err(format!(
                "autoplay min_charge_ticks ({}) exceeds max_charge_ticks ({})",
                self.min_charge_ticks, self.max_charge_ticks
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub broadcast_rate_hz: u32,
    pub max_connections: usize,
    /// Messages per second a viewer may send before being disconnected
    pub max_client_msgs_per_sec: u32,
    /// Allowed `Origin` headers. Empty allows any origin.
    pub allowed_origins: Vec<String>,
    pub rng_seed: u64,
    pub autoplay: AutoplayConfig,
    pub sim: SimConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9001".to_string(),
            broadcast_rate_hz: 30,
            max_connections: 1000,
            max_client_msgs_per_sec: 30,
            allowed_origins: Vec::new(),
            rng_seed: 42,
            autoplay: AutoplayConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `BILLIARDS_*` environment variables.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BILLIARDS_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(hz) = parse_env::<u32>("BILLIARDS_TICK_RATE_HZ")? {
            config.sim.physics.tick_rate_hz = hz;
        }
        if let Some(hz) = parse_env::<u32>("BILLIARDS_BROADCAST_RATE_HZ")? {
            config.broadcast_rate_hz = hz;
        }
        if let Some(secs) = parse_env::<f64>("BILLIARDS_AUTOPLAY_IDLE_SECS")? {
            config.autoplay.idle_secs = secs;
        }
        if let Ok(origins) = std::env::var("BILLIARDS_ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }

    /// Ticks between `table_state` broadcasts
    pub fn broadcast_every_n(&self) -> u32 {
        (self.sim.physics.tick_rate_hz / self.broadcast_rate_hz).max(1)
    }

    /// Validate configuration, returning an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.sim.validate()?;
        self.autoplay.validate()?;

        if self.broadcast_rate_hz == 0 {
            return Err("broadcast_rate_hz must be > 0".to_string());
        }
        if self.broadcast_rate_hz > self.sim.physics.tick_rate_hz {
            return Err(format!(
                "broadcast_rate_hz ({}) cannot exceed tick_rate_hz ({})",
                self.broadcast_rate_hz, self.sim.physics.tick_rate_hz
            ));
        }
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }
        if self.max_client_msgs_per_sec == 0 {
            return Err("max_client_msgs_per_sec must be > 0".to_string());
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(None),
    }
}
