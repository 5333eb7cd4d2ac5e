/// Renderer lifecycle: `Idle -> Ready -> Terminated`.
///
/// `Idle -> Ready` happens once, after the shader program and geometry are
/// verified. `Idle -> Terminated` covers a failed startup. Nothing leaves
/// `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Ready,
    Terminated,
}

/// Errors from illegal lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot enter Ready from {0:?}")]
    NotIdle(Lifecycle),
    #[error("renderer already terminated")]
    AlreadyTerminated,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Resources are bound and frames may be drawn.
    pub fn is_ready(&self) -> bool {
        matches!(self, Lifecycle::Ready)
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Lifecycle::Terminated)
    }

    /// One-shot `Idle -> Ready`.
    pub fn enter_ready(&mut self) -> Result<(), LifecycleError> {
        match self {
            Lifecycle::Idle => {
                *self = Lifecycle::Ready;
                tracing::debug!("lifecycle: Idle -> Ready");
                Ok(())
            }
            other => Err(LifecycleError::NotIdle(*other)),
        }
    }

    /// `Idle | Ready -> Terminated`. Returns the state that was left.
    pub fn terminate(&mut self) -> Result<Lifecycle, LifecycleError> {
        match *self {
            Lifecycle::Terminated => Err(LifecycleError::AlreadyTerminated),
            previous => {
                *self = Lifecycle::Terminated;
                tracing::debug!("lifecycle: {previous:?} -> Terminated");
                Ok(previous)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc, Lifecycle::Idle);
        lc.enter_ready().unwrap();
        assert!(lc.is_ready());
        assert_eq!(lc.terminate().unwrap(), Lifecycle::Ready);
        assert!(lc.is_terminated());
    }

    #[test]
    fn ready_is_one_shot() {
        let mut lc = Lifecycle::new();
        lc.enter_ready().unwrap();
        assert_eq!(
            lc.enter_ready(),
            Err(LifecycleError::NotIdle(Lifecycle::Ready))
        );
    }

    #[test]
    fn failed_startup_terminates_from_idle() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.terminate().unwrap(), Lifecycle::Idle);
        assert!(!lc.is_ready());
        assert_eq!(
            lc.enter_ready(),
            Err(LifecycleError::NotIdle(Lifecycle::Terminated))
        );
    }

    #[test]
    fn terminate_twice_is_an_error() {
        let mut lc = Lifecycle::new();
        lc.terminate().unwrap();
        assert_eq!(lc.terminate(), Err(LifecycleError::AlreadyTerminated));
    }
}
