use kvcore_vfs::Filesystem;

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};

/// Lifecycle state of a [`Service`] (spec §4.8). `Error` is reachable from
/// every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Init,
    Ready,
    Running,
    Stopped,
    Error,
}

/// The embedded-service lifecycle contract (spec §4.8): `init/start/stop/
/// reload/status`, each idempotent with respect to its target state.
/// Concrete services (a TCP forwarder, the dispatcher over a real
/// listener, an embedded SQL wrapper) are collaborators outside this
/// crate's scope; this is the trait boundary they'd implement.
pub trait Service {
    fn init(&mut self) -> EngineResult<()>;
    fn start(&mut self) -> EngineResult<()>;
    fn stop(&mut self) -> EngineResult<()>;
    fn reload(&mut self) -> EngineResult<()>;
    fn status(&self) -> ServiceState;
}

/// Drives an [`Engine`] through the `{Init -> Ready -> Running -> Stopped}`
/// state machine. `kvcored` wraps this around the engine it opens; the
/// dispatcher is invoked only while `status() == Running`.
pub struct EngineService<F: Filesystem> {
    engine: Engine<F>,
    state: ServiceState,
}

impl<F: Filesystem> EngineService<F> {
    #[must_use]
    pub fn new(engine: Engine<F>) -> Self {
        Self { engine, state: ServiceState::Init }
    }

    #[must_use]
    pub fn engine(&self) -> &Engine<F> {
        &self.engine
    }
}

impl<F: Filesystem> Service for EngineService<F> {
    /// `Init -> Ready`. Idempotent: calling it again once already `Ready`
    /// or later is a no-op success, matching every other lifecycle method.
    fn init(&mut self) -> EngineResult<()> {
        match self.state {
            ServiceState::Init => {
                self.state = ServiceState::Ready;
                Ok(())
            }
            ServiceState::Ready | ServiceState::Running | ServiceState::Stopped => Ok(()),
            ServiceState::Error => Err(EngineError::Internal("service is in the Error state".to_owned())),
        }
    }

    /// `Ready -> Running`. A no-op success if already `Running`.
    fn start(&mut self) -> EngineResult<()> {
        match self.state {
            ServiceState::Init => Err(EngineError::Internal("service has not been initialized".to_owned())),
            ServiceState::Ready => {
                self.state = ServiceState::Running;
                Ok(())
            }
            ServiceState::Running => Ok(()),
            ServiceState::Stopped => Err(EngineError::Closed),
            ServiceState::Error => Err(EngineError::Internal("service is in the Error state".to_owned())),
        }
    }

    /// `Running -> Stopped`, closing the underlying engine. A no-op
    /// success if already `Stopped`.
    fn stop(&mut self) -> EngineResult<()> {
        match self.state {
            ServiceState::Stopped => Ok(()),
            ServiceState::Init | ServiceState::Ready | ServiceState::Running => {
                self.engine.close()?;
                self.state = ServiceState::Stopped;
                Ok(())
            }
            ServiceState::Error => Err(EngineError::Internal("service is in the Error state".to_owned())),
        }
    }

    /// No configuration is currently reloadable without a restart; this
    /// is accepted while `Running` and otherwise rejected, per the
    /// lifecycle's "idempotent with respect to its target state" contract.
    fn reload(&mut self) -> EngineResult<()> {
        match self.state {
            ServiceState::Running => Ok(()),
            ServiceState::Init | ServiceState::Ready | ServiceState::Stopped => {
                Err(EngineError::Internal("service is not Running".to_owned()))
            }
            ServiceState::Error => Err(EngineError::Internal("service is in the Error state".to_owned())),
        }
    }

    fn status(&self) -> ServiceState {
        self.state
    }
}
