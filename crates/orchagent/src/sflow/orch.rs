//! SflowOrch implementation.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::oid::RawSaiObjectId;

use super::types::{
    parse_admin_state, PortSflowInfo, SampleDirection, SflowConfig, SflowPortInfoMap,
    SflowRateSampleMap, SflowSession,
};

/// Sflow orchestrator error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SflowOrchError {
    #[error("Port not found: {0}")]
    PortNotFound(String),
    #[error("Ports not ready")]
    PortNotReady,
    #[error("Invalid sflow config: {0}")]
    InvalidConfig(String),
    #[error("SAI error: {0}")]
    SaiError(String),
    #[error("Sflow session not found: 0x{0:x}")]
    SessionNotFound(RawSaiObjectId),
}

/// Callbacks for SflowOrch operations.
pub trait SflowOrchCallbacks: Send + Sync {
    /// Creates a samplepacket session via SAI.
    fn create_samplepacket_session(&self, rate: NonZeroU32) -> Result<RawSaiObjectId, String>;

    fn remove_samplepacket_session(&self, session_id: RawSaiObjectId) -> Result<(), String>;

    fn enable_port_ingress_sample(
        &self,
        port_id: RawSaiObjectId,
        session_id: RawSaiObjectId,
    ) -> Result<(), String>;

    fn disable_port_ingress_sample(&self, port_id: RawSaiObjectId) -> Result<(), String>;

    fn enable_port_egress_sample(
        &self,
        port_id: RawSaiObjectId,
        session_id: RawSaiObjectId,
    ) -> Result<(), String>;

    fn disable_port_egress_sample(&self, port_id: RawSaiObjectId) -> Result<(), String>;

    /// Gets port SAI object ID by alias.
    fn get_port_id(&self, alias: &str) -> Option<RawSaiObjectId>;

    /// Returns true once PortsOrch has finished port initialization.
    fn all_ports_ready(&self) -> bool;
}

/// Sflow orchestrator configuration.
#[derive(Debug, Clone, Default)]
pub struct SflowOrchConfig {
    /// Global admin state applied at construction.
    pub enabled: bool,
}

/// Sflow orchestrator statistics.
#[derive(Debug, Clone, Default)]
pub struct SflowOrchStats {
    pub sessions_created: u64,
    pub sessions_destroyed: u64,
    pub ports_configured: u64,
    pub ports_unconfigured: u64,
    pub rate_updates: u64,
    pub direction_updates: u64,
}

/// Sflow orchestrator for packet sampling.
///
/// Ports sampling at the same rate share one samplepacket session. The
/// session is created with the first port at that rate and destroyed when
/// the last one leaves.
pub struct SflowOrch {
    config: SflowOrchConfig,
    enabled: bool,
    port_info: SflowPortInfoMap,
    sessions: SflowRateSampleMap,
    /// Reverse index: session ID -> rate.
    session_to_rate: HashMap<RawSaiObjectId, NonZeroU32>,
    callbacks: Option<Arc<dyn SflowOrchCallbacks>>,
    stats: SflowOrchStats,
}

impl std::fmt::Debug for SflowOrch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SflowOrch")
            .field("config", &self.config)
            .field("enabled", &self.enabled)
            .field("port_count", &self.port_info.len())
            .field("session_count", &self.sessions.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl SflowOrch {
    pub fn new(config: SflowOrchConfig) -> Self {
        Self {
            enabled: config.enabled,
            config,
            port_info: SflowPortInfoMap::new(),
            sessions: SflowRateSampleMap::new(),
            session_to_rate: HashMap::new(),
            callbacks: None,
            stats: SflowOrchStats::default(),
        }
    }

    pub fn set_callbacks(&mut self, callbacks: Arc<dyn SflowOrchCallbacks>) {
        self.callbacks = Some(callbacks);
    }

    pub fn config(&self) -> &SflowOrchConfig {
        &self.config
    }

    pub fn stats(&self) -> &SflowOrchStats {
        &self.stats
    }

    /// Returns true if sflow is globally enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the global status. Existing sessions and port state are kept.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("sFlow globally {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    /// Handles one field of the APPL_DB `SFLOW_TABLE|global` entry.
    pub fn handle_global_field(&mut self, field: &str, value: &str) -> Result<(), SflowOrchError> {
        match field {
            "admin_state" => {
                let enabled = parse_admin_state(value).map_err(SflowOrchError::InvalidConfig)?;
                self.set_enabled(enabled);
            }
            _ => debug!("Ignoring sFlow global field {}", field),
        }
        Ok(())
    }

    pub fn port_count(&self) -> usize {
        self.port_info.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn get_port_info(&self, port_id: RawSaiObjectId) -> Option<&PortSflowInfo> {
        self.port_info.get(&port_id)
    }

    pub fn get_session(&self, rate: NonZeroU32) -> Option<&SflowSession> {
        self.sessions.get(&rate)
    }

    /// Gets the sample rate for a session ID.
    pub fn get_session_rate(&self, session_id: RawSaiObjectId) -> Option<NonZeroU32> {
        self.session_to_rate.get(&session_id).copied()
    }

    fn require_callbacks(&self) -> Result<Arc<dyn SflowOrchCallbacks>, SflowOrchError> {
        self.callbacks
            .clone()
            .ok_or_else(|| SflowOrchError::InvalidConfig("No callbacks set".to_string()))
    }

    /// Takes a reference on the session for `rate`, creating it if needed.
    fn acquire_session(
        &mut self,
        callbacks: &dyn SflowOrchCallbacks,
        rate: NonZeroU32,
    ) -> Result<RawSaiObjectId, SflowOrchError> {
        if !self.sessions.contains_key(&rate) {
            let session_id = callbacks
                .create_samplepacket_session(rate)
                .map_err(SflowOrchError::SaiError)?;
            info!("Created sFlow session 0x{:x} with rate {}", session_id, rate);

            self.sessions.insert(rate, SflowSession::new(session_id, rate));
            self.session_to_rate.insert(session_id, rate);
            self.stats.sessions_created += 1;
        }

        let session = self
            .sessions
            .get_mut(&rate)
            .ok_or_else(|| SflowOrchError::InvalidConfig(format!("No session for rate {}", rate)))?;
        session.add_ref();
        Ok(session.session_id)
    }

    /// Drops a reference on the session for `rate`, destroying it at zero.
    fn release_session(
        &mut self,
        callbacks: &dyn SflowOrchCallbacks,
        rate: NonZeroU32,
    ) -> Result<(), SflowOrchError> {
        let remaining = match self.sessions.get_mut(&rate) {
            Some(session) => session.remove_ref(),
            None => return Ok(()),
        };
        if remaining > 0 {
            return Ok(());
        }

        if let Some(session) = self.sessions.remove(&rate) {
            self.session_to_rate.remove(&session.session_id);
            callbacks
                .remove_samplepacket_session(session.session_id)
                .map_err(SflowOrchError::SaiError)?;
            info!("Removed sFlow session 0x{:x} with rate {}", session.session_id, rate);
            self.stats.sessions_destroyed += 1;
        }
        Ok(())
    }

    fn apply_port_sampling(
        callbacks: &dyn SflowOrchCallbacks,
        port_id: RawSaiObjectId,
        session_id: RawSaiObjectId,
        direction: SampleDirection,
    ) -> Result<(), SflowOrchError> {
        if direction.has_ingress() {
            callbacks
                .enable_port_ingress_sample(port_id, session_id)
                .map_err(SflowOrchError::SaiError)?;
        }
        if direction.has_egress() {
            callbacks
                .enable_port_egress_sample(port_id, session_id)
                .map_err(SflowOrchError::SaiError)?;
        }
        Ok(())
    }

    fn remove_port_sampling(
        callbacks: &dyn SflowOrchCallbacks,
        port_id: RawSaiObjectId,
        direction: SampleDirection,
    ) -> Result<(), SflowOrchError> {
        if direction.has_ingress() {
            callbacks
                .disable_port_ingress_sample(port_id)
                .map_err(SflowOrchError::SaiError)?;
        }
        if direction.has_egress() {
            callbacks
                .disable_port_egress_sample(port_id)
                .map_err(SflowOrchError::SaiError)?;
        }
        Ok(())
    }

    /// Undoes a port whose sampling could not be applied. The port keeps no
    /// sampling and no session reference.
    fn abandon_port(
        &mut self,
        callbacks: &dyn SflowOrchCallbacks,
        port_id: RawSaiObjectId,
        rate: NonZeroU32,
        direction: SampleDirection,
    ) {
        if let Err(e) = Self::remove_port_sampling(callbacks, port_id, direction) {
            warn!("Failed to clear sFlow sampling on port 0x{:x}: {}", port_id, e);
        }
        if let Err(e) = self.release_session(callbacks, rate) {
            warn!("Failed to release sFlow session with rate {}: {}", rate, e);
        }
    }

    /// Configures sflow on a port.
    ///
    /// Ignored while sflow is globally disabled. A port whose admin state is
    /// down keeps its session reference but has no sampling applied. If
    /// sampling cannot be applied the port is left unconfigured.
    pub fn configure_port(
        &mut self,
        alias: &str,
        config: SflowConfig,
    ) -> Result<(), SflowOrchError> {
        let callbacks = self.require_callbacks()?;

        if !callbacks.all_ports_ready() {
            return Err(SflowOrchError::PortNotReady);
        }

        if !self.enabled {
            debug!("sFlow disabled, ignoring config for {}", alias);
            return Ok(());
        }

        let port_id = callbacks
            .get_port_id(alias)
            .ok_or_else(|| SflowOrchError::PortNotFound(alias.to_string()))?;

        let rate = config
            .rate
            .ok_or_else(|| SflowOrchError::InvalidConfig("Sample rate required".to_string()))?;

        let old = match self.port_info.get(&port_id) {
            Some(info) => info.clone(),
            None => {
                let session_id = self.acquire_session(callbacks.as_ref(), rate)?;
                if config.admin_state {
                    let applied = Self::apply_port_sampling(
                        callbacks.as_ref(),
                        port_id,
                        session_id,
                        config.direction,
                    );
                    if let Err(e) = applied {
                        self.abandon_port(callbacks.as_ref(), port_id, rate, config.direction);
                        return Err(e);
                    }
                }
                self.port_info.insert(
                    port_id,
                    PortSflowInfo::new(config.admin_state, config.direction, session_id),
                );
                self.stats.ports_configured += 1;
                info!(
                    "Configured sFlow on {} rate {} direction {}",
                    alias, rate, config.direction
                );
                return Ok(());
            }
        };

        let old_rate = self
            .get_session_rate(old.session_id)
            .ok_or(SflowOrchError::SessionNotFound(old.session_id))?;

        let rate_changed = old_rate != rate;
        let direction_changed = old.direction != config.direction;
        if !rate_changed && !direction_changed && old.admin_state == config.admin_state {
            return Ok(());
        }

        if old.admin_state {
            Self::remove_port_sampling(callbacks.as_ref(), port_id, old.direction)?;
        }

        let session_id = if rate_changed {
            let session_id = self.acquire_session(callbacks.as_ref(), rate)?;
            self.release_session(callbacks.as_ref(), old_rate)?;
            self.stats.rate_updates += 1;
            session_id
        } else {
            old.session_id
        };
        if direction_changed {
            self.stats.direction_updates += 1;
        }

        if config.admin_state {
            let applied = Self::apply_port_sampling(
                callbacks.as_ref(),
                port_id,
                session_id,
                config.direction,
            );
            if let Err(e) = applied {
                self.port_info.remove(&port_id);
                self.abandon_port(callbacks.as_ref(), port_id, rate, config.direction);
                self.stats.ports_unconfigured += 1;
                return Err(e);
            }
        }

        self.port_info.insert(
            port_id,
            PortSflowInfo::new(config.admin_state, config.direction, session_id),
        );
        debug!("Updated sFlow on {} rate {} direction {}", alias, rate, config.direction);
        Ok(())
    }

    /// Removes sflow configuration from a port.
    pub fn remove_port(&mut self, alias: &str) -> Result<(), SflowOrchError> {
        let callbacks = self.require_callbacks()?;

        let port_id = callbacks
            .get_port_id(alias)
            .ok_or_else(|| SflowOrchError::PortNotFound(alias.to_string()))?;

        let info = self
            .port_info
            .get(&port_id)
            .cloned()
            .ok_or_else(|| SflowOrchError::PortNotFound(alias.to_string()))?;
        let rate = self
            .get_session_rate(info.session_id)
            .ok_or(SflowOrchError::SessionNotFound(info.session_id))?;

        if info.admin_state {
            Self::remove_port_sampling(callbacks.as_ref(), port_id, info.direction)?;
        }

        self.port_info.remove(&port_id);
        self.release_session(callbacks.as_ref(), rate)?;

        self.stats.ports_unconfigured += 1;
        info!("Removed sFlow from {}", alias);
        Ok(())
    }
}

// ============ Testing Facade ============

#[cfg(any(test, feature = "test-portal"))]
impl SflowOrch {
    /// Rate to session map.
    pub fn inspect_sample_rate_map(&self) -> &SflowRateSampleMap {
        &self.sessions
    }

    /// Port to sampling state map.
    pub fn inspect_port_info_map(&self) -> &SflowPortInfoMap {
        &self.port_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct TestCallbacks {
        created_sessions: Mutex<Vec<(RawSaiObjectId, NonZeroU32)>>,
        removed_sessions: Mutex<Vec<RawSaiObjectId>>,
        port_ops: Mutex<Vec<String>>,
        next_session_id: Mutex<RawSaiObjectId>,
        ports_ready: bool,
        fail_ingress_enable: AtomicBool,
        fail_egress_enable: AtomicBool,
        fail_disable: AtomicBool,
    }

    impl TestCallbacks {
        fn new() -> Self {
            Self {
                created_sessions: Mutex::new(Vec::new()),
                removed_sessions: Mutex::new(Vec::new()),
                port_ops: Mutex::new(Vec::new()),
                next_session_id: Mutex::new(0x1000),
                ports_ready: true,
                fail_ingress_enable: AtomicBool::new(false),
                fail_egress_enable: AtomicBool::new(false),
                fail_disable: AtomicBool::new(false),
            }
        }

        fn with_ports_ready(ports_ready: bool) -> Self {
            Self {
                ports_ready,
                ..Self::new()
            }
        }

        fn ops(&self) -> Vec<String> {
            self.port_ops.lock().unwrap().clone()
        }
    }

    impl SflowOrchCallbacks for TestCallbacks {
        fn create_samplepacket_session(&self, rate: NonZeroU32) -> Result<RawSaiObjectId, String> {
            let mut next_id = self.next_session_id.lock().unwrap();
            let session_id = *next_id;
            *next_id += 1;
            self.created_sessions.lock().unwrap().push((session_id, rate));
            Ok(session_id)
        }

        fn remove_samplepacket_session(&self, session_id: RawSaiObjectId) -> Result<(), String> {
            self.removed_sessions.lock().unwrap().push(session_id);
            Ok(())
        }

        fn enable_port_ingress_sample(
            &self,
            port_id: RawSaiObjectId,
            session_id: RawSaiObjectId,
        ) -> Result<(), String> {
            if self.fail_ingress_enable.load(Ordering::SeqCst) {
                return Err("ingress sampling rejected".to_string());
            }
            self.port_ops
                .lock()
                .unwrap()
                .push(format!("enable_ingress:{:x}:{:x}", port_id, session_id));
            Ok(())
        }

        fn disable_port_ingress_sample(&self, port_id: RawSaiObjectId) -> Result<(), String> {
            if self.fail_disable.load(Ordering::SeqCst) {
                return Err("disable rejected".to_string());
            }
            self.port_ops
                .lock()
                .unwrap()
                .push(format!("disable_ingress:{:x}", port_id));
            Ok(())
        }

        fn enable_port_egress_sample(
            &self,
            port_id: RawSaiObjectId,
            session_id: RawSaiObjectId,
        ) -> Result<(), String> {
            if self.fail_egress_enable.load(Ordering::SeqCst) {
                return Err("egress sampling rejected".to_string());
            }
            self.port_ops
                .lock()
                .unwrap()
                .push(format!("enable_egress:{:x}:{:x}", port_id, session_id));
            Ok(())
        }

        fn disable_port_egress_sample(&self, port_id: RawSaiObjectId) -> Result<(), String> {
            if self.fail_disable.load(Ordering::SeqCst) {
                return Err("disable rejected".to_string());
            }
            self.port_ops
                .lock()
                .unwrap()
                .push(format!("disable_egress:{:x}", port_id));
            Ok(())
        }

        fn get_port_id(&self, alias: &str) -> Option<RawSaiObjectId> {
            match alias {
                "Ethernet0" => Some(0x100),
                "Ethernet4" => Some(0x104),
                _ => None,
            }
        }

        fn all_ports_ready(&self) -> bool {
            self.ports_ready
        }
    }

    fn enabled_orch() -> (SflowOrch, Arc<TestCallbacks>) {
        let mut orch = SflowOrch::new(SflowOrchConfig { enabled: true });
        let callbacks = Arc::new(TestCallbacks::new());
        orch.set_callbacks(callbacks.clone());
        (orch, callbacks)
    }

    fn port_config(rate: u32, direction: SampleDirection) -> SflowConfig {
        SflowConfig {
            admin_state: true,
            rate: NonZeroU32::new(rate),
            direction,
        }
    }

    #[test]
    fn test_sflow_orch_new() {
        let orch = SflowOrch::new(SflowOrchConfig::default());
        assert!(!orch.is_enabled());
        assert_eq!(orch.port_count(), 0);
        assert_eq!(orch.session_count(), 0);
    }

    #[test]
    fn test_handle_global_field() {
        let mut orch = SflowOrch::new(SflowOrchConfig::default());

        orch.handle_global_field("admin_state", "up").unwrap();
        assert!(orch.is_enabled());

        orch.handle_global_field("admin_state", "down").unwrap();
        assert!(!orch.is_enabled());

        assert!(matches!(
            orch.handle_global_field("admin_state", "sideways"),
            Err(SflowOrchError::InvalidConfig(_))
        ));
        assert!(orch.handle_global_field("agent_id", "eth0").is_ok());
    }

    #[test]
    fn test_configure_port() {
        let (mut orch, callbacks) = enabled_orch();

        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();

        assert_eq!(orch.port_count(), 1);
        assert_eq!(orch.session_count(), 1);
        assert_eq!(
            *callbacks.created_sessions.lock().unwrap(),
            vec![(0x1000, NonZeroU32::new(4096).unwrap())]
        );
        assert_eq!(callbacks.ops(), vec!["enable_ingress:100:1000".to_string()]);

        let info = orch.get_port_info(0x100).unwrap();
        assert_eq!(info.session_id, 0x1000);
        assert_eq!(orch.get_session_rate(0x1000), NonZeroU32::new(4096));
    }

    #[test]
    fn test_configure_port_disabled() {
        let mut orch = SflowOrch::new(SflowOrchConfig::default());
        orch.set_callbacks(Arc::new(TestCallbacks::new()));

        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();

        assert_eq!(orch.port_count(), 0);
        assert_eq!(orch.session_count(), 0);
    }

    #[test]
    fn test_configure_port_errors() {
        let mut orch = SflowOrch::new(SflowOrchConfig { enabled: true });
        assert!(matches!(
            orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx)),
            Err(SflowOrchError::InvalidConfig(_))
        ));

        orch.set_callbacks(Arc::new(TestCallbacks::with_ports_ready(false)));
        assert_eq!(
            orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx)),
            Err(SflowOrchError::PortNotReady)
        );

        let (mut orch, _callbacks) = enabled_orch();
        assert_eq!(
            orch.configure_port("Ethernet8", port_config(4096, SampleDirection::Rx)),
            Err(SflowOrchError::PortNotFound("Ethernet8".to_string()))
        );
        assert!(matches!(
            orch.configure_port("Ethernet0", port_config(0, SampleDirection::Rx)),
            Err(SflowOrchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_configure_port_both_direction() {
        let (mut orch, callbacks) = enabled_orch();

        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Both))
            .unwrap();

        assert_eq!(
            callbacks.ops(),
            vec![
                "enable_ingress:100:1000".to_string(),
                "enable_egress:100:1000".to_string()
            ]
        );
    }

    #[test]
    fn test_session_sharing() {
        let (mut orch, callbacks) = enabled_orch();
        let config = port_config(4096, SampleDirection::Rx);

        orch.configure_port("Ethernet0", config.clone()).unwrap();
        orch.configure_port("Ethernet4", config).unwrap();

        assert_eq!(orch.port_count(), 2);
        assert_eq!(orch.session_count(), 1);
        assert_eq!(callbacks.created_sessions.lock().unwrap().len(), 1);

        let session = orch.get_session(NonZeroU32::new(4096).unwrap()).unwrap();
        assert_eq!(session.ref_count, 2);
    }

    #[test]
    fn test_reconfigure_same_port_is_noop() {
        let (mut orch, callbacks) = enabled_orch();
        let config = port_config(4096, SampleDirection::Rx);

        orch.configure_port("Ethernet0", config.clone()).unwrap();
        orch.configure_port("Ethernet0", config).unwrap();

        assert_eq!(callbacks.ops().len(), 1);
        let session = orch.get_session(NonZeroU32::new(4096).unwrap()).unwrap();
        assert_eq!(session.ref_count, 1);
    }

    #[test]
    fn test_rate_update() {
        let (mut orch, callbacks) = enabled_orch();

        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();
        orch.configure_port("Ethernet0", port_config(8192, SampleDirection::Rx))
            .unwrap();

        assert_eq!(orch.session_count(), 1);
        assert!(orch.get_session(NonZeroU32::new(8192).unwrap()).is_some());
        assert_eq!(orch.stats().rate_updates, 1);
        assert_eq!(*callbacks.removed_sessions.lock().unwrap(), vec![0x1000]);
        assert_eq!(orch.get_port_info(0x100).unwrap().session_id, 0x1001);
        assert_eq!(
            callbacks.ops(),
            vec![
                "enable_ingress:100:1000".to_string(),
                "disable_ingress:100".to_string(),
                "enable_ingress:100:1001".to_string()
            ]
        );
    }

    #[test]
    fn test_direction_update() {
        let (mut orch, callbacks) = enabled_orch();

        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();
        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Both))
            .unwrap();

        assert_eq!(orch.stats().direction_updates, 1);
        assert_eq!(orch.stats().rate_updates, 0);
        assert_eq!(
            callbacks.ops(),
            vec![
                "enable_ingress:100:1000".to_string(),
                "disable_ingress:100".to_string(),
                "enable_ingress:100:1000".to_string(),
                "enable_egress:100:1000".to_string()
            ]
        );
        assert_eq!(
            orch.get_port_info(0x100).unwrap().direction,
            SampleDirection::Both
        );
    }

    #[test]
    fn test_port_admin_down_keeps_session() {
        let (mut orch, callbacks) = enabled_orch();

        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();
        let mut config = port_config(4096, SampleDirection::Rx);
        config.admin_state = false;
        orch.configure_port("Ethernet0", config).unwrap();

        assert!(!orch.get_port_info(0x100).unwrap().admin_state);
        assert_eq!(orch.session_count(), 1);
        assert_eq!(callbacks.ops().last().map(String::as_str), Some("disable_ingress:100"));

        orch.remove_port("Ethernet0").unwrap();
        assert_eq!(callbacks.ops().len(), 2);
        assert_eq!(orch.session_count(), 0);
    }

    #[test]
    fn test_remove_port() {
        let (mut orch, callbacks) = enabled_orch();

        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();
        orch.remove_port("Ethernet0").unwrap();

        assert_eq!(orch.port_count(), 0);
        assert_eq!(orch.session_count(), 0);
        assert_eq!(*callbacks.removed_sessions.lock().unwrap(), vec![0x1000]);
        assert!(callbacks.ops().contains(&"disable_ingress:100".to_string()));

        assert_eq!(
            orch.remove_port("Ethernet0"),
            Err(SflowOrchError::PortNotFound("Ethernet0".to_string()))
        );
    }

    #[test]
    fn test_remove_port_shared_session() {
        let (mut orch, callbacks) = enabled_orch();
        let config = port_config(4096, SampleDirection::Rx);

        orch.configure_port("Ethernet0", config.clone()).unwrap();
        orch.configure_port("Ethernet4", config).unwrap();

        orch.remove_port("Ethernet0").unwrap();
        assert_eq!(orch.session_count(), 1);
        assert!(callbacks.removed_sessions.lock().unwrap().is_empty());

        orch.remove_port("Ethernet4").unwrap();
        assert_eq!(orch.session_count(), 0);
        assert_eq!(callbacks.removed_sessions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_apply_failure_releases_session() {
        let (mut orch, callbacks) = enabled_orch();
        callbacks.fail_ingress_enable.store(true, Ordering::SeqCst);

        assert!(matches!(
            orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx)),
            Err(SflowOrchError::SaiError(_))
        ));

        assert_eq!(orch.port_count(), 0);
        assert!(orch.inspect_sample_rate_map().is_empty());
        assert_eq!(*callbacks.removed_sessions.lock().unwrap(), vec![0x1000]);
        assert_eq!(orch.stats().ports_configured, 0);
    }

    #[test]
    fn test_partial_apply_is_rolled_back() {
        let (mut orch, callbacks) = enabled_orch();
        callbacks.fail_egress_enable.store(true, Ordering::SeqCst);

        assert!(orch
            .configure_port("Ethernet0", port_config(4096, SampleDirection::Both))
            .is_err());

        assert_eq!(
            callbacks.ops(),
            vec![
                "enable_ingress:100:1000".to_string(),
                "disable_ingress:100".to_string(),
                "disable_egress:100".to_string()
            ]
        );
        assert_eq!(orch.session_count(), 0);
    }

    #[test]
    fn test_update_failure_unconfigures_port() {
        let (mut orch, callbacks) = enabled_orch();
        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();

        callbacks.fail_ingress_enable.store(true, Ordering::SeqCst);
        assert!(orch
            .configure_port("Ethernet0", port_config(8192, SampleDirection::Rx))
            .is_err());

        assert!(orch.inspect_port_info_map().is_empty());
        assert!(orch.inspect_sample_rate_map().is_empty());
        assert_eq!(*callbacks.removed_sessions.lock().unwrap(), vec![0x1000, 0x1001]);
    }

    #[test]
    fn test_remove_port_failure_keeps_state() {
        let (mut orch, callbacks) = enabled_orch();
        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();

        callbacks.fail_disable.store(true, Ordering::SeqCst);
        assert!(matches!(
            orch.remove_port("Ethernet0"),
            Err(SflowOrchError::SaiError(_))
        ));
        assert_eq!(orch.port_count(), 1);
        let session = orch.get_session(NonZeroU32::new(4096).unwrap()).unwrap();
        assert_eq!(session.ref_count, 1);

        callbacks.fail_disable.store(false, Ordering::SeqCst);
        orch.remove_port("Ethernet0").unwrap();
        assert_eq!(orch.port_count(), 0);
        assert_eq!(orch.session_count(), 0);
        assert_eq!(*callbacks.removed_sessions.lock().unwrap(), vec![0x1000]);
    }

    #[test]
    fn test_toggle_keeps_maps() {
        let (mut orch, _callbacks) = enabled_orch();
        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();

        let sessions = orch.inspect_sample_rate_map().clone();
        let ports = orch.inspect_port_info_map().clone();

        orch.set_enabled(false);
        orch.set_enabled(true);

        assert_eq!(orch.inspect_sample_rate_map(), &sessions);
        assert_eq!(orch.inspect_port_info_map(), &ports);
    }

    #[test]
    fn test_statistics() {
        let (mut orch, _callbacks) = enabled_orch();

        orch.configure_port("Ethernet0", port_config(4096, SampleDirection::Rx))
            .unwrap();
        orch.configure_port("Ethernet4", port_config(4096, SampleDirection::Rx))
            .unwrap();
        orch.configure_port("Ethernet0", port_config(8192, SampleDirection::Rx))
            .unwrap();
        orch.remove_port("Ethernet4").unwrap();

        let stats = orch.stats();
        assert_eq!(stats.sessions_created, 2);
        assert_eq!(stats.sessions_destroyed, 1);
        assert_eq!(stats.ports_configured, 2);
        assert_eq!(stats.ports_unconfigured, 1);
        assert_eq!(stats.rate_updates, 1);
    }
}
