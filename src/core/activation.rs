//! Focus-stealing prevention and activation policy.

use crate::core::window::UserTime;

/// Global focus-stealing-prevention level, configurable per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    None,
    Low,
    Normal,
    High,
    Extreme,
}

#[derive(Debug, Clone, Copy)]
pub struct ActivationRequest {
    pub user_time: UserTime,
    pub is_transient_descendant_of_active: bool,
    pub focus_in: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ActiveWindowInfo {
    pub user_time: UserTime,
}

/// `activation.allow_activation`.
pub fn allow_activation(
    level: Level,
    request: ActivationRequest,
    active: Option<ActiveWindowInfo>,
    in_startup_grace_period: bool,
) -> bool {
    if in_startup_grace_period {
        return true;
    }
    if request.is_transient_descendant_of_active {
        return true;
    }

    match level {
        Level::None => true,
        Level::Extreme => false,
        Level::Low => {
            let Some(active) = active else { return true };
            if matches!(active.user_time, UserTime::Unset) {
                return true;
            }
            allow_at_normal_level(request, active)
        }
        Level::Normal => {
            let Some(active) = active else { return true };
            if matches!(active.user_time, UserTime::Unset) {
                return true;
            }
            allow_at_normal_level(request, active)
        }
        Level::High => {
            let Some(active) = active else { return false };
            if matches!(active.user_time, UserTime::Unset) {
                return false;
            }
            allow_at_normal_level(request, active)
        }
    }
}

fn allow_at_normal_level(request: ActivationRequest, active: ActiveWindowInfo) -> bool {
    if matches!(request.user_time, UserTime::ExplicitZero) {
        return false;
    }
    request.user_time.at_least_as_new_as(active.user_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_active_window_allows() {
        assert!(allow_activation(
            Level::Normal,
            ActivationRequest {
                user_time: UserTime::Timestamp(1),
                is_transient_descendant_of_active: false,
                focus_in: false,
            },
            None,
            false,
        ));
    }

    #[test]
    fn explicit_zero_user_time_is_denied() {
        let active = Some(ActiveWindowInfo { user_time: UserTime::Timestamp(1000) });
        assert!(!allow_activation(
            Level::Normal,
            ActivationRequest {
                user_time: UserTime::ExplicitZero,
                is_transient_descendant_of_active: false,
                focus_in: false,
            },
            active,
            false,
        ));
    }

    #[test]
    fn newer_user_time_wins_scenario_6() {
        let active = Some(ActiveWindowInfo { user_time: UserTime::Timestamp(1000) });
        assert!(!allow_activation(
            Level::Normal,
            ActivationRequest {
                user_time: UserTime::Timestamp(500),
                is_transient_descendant_of_active: false,
                focus_in: false,
            },
            active,
            false,
        ));
        assert!(allow_activation(
            Level::Normal,
            ActivationRequest {
                user_time: UserTime::Timestamp(2000),
                is_transient_descendant_of_active: false,
                focus_in: false,
            },
            active,
            false,
        ));
    }

    #[test]
    fn transient_descendant_of_active_always_allowed() {
        let active = Some(ActiveWindowInfo { user_time: UserTime::Timestamp(1000) });
        assert!(allow_activation(
            Level::Extreme,
            ActivationRequest {
                user_time: UserTime::ExplicitZero,
                is_transient_descendant_of_active: true,
                focus_in: false,
            },
            active,
            false,
        ));
    }

    #[test]
    fn extreme_level_denies_even_with_newer_user_time() {
        let active = Some(ActiveWindowInfo { user_time: UserTime::Timestamp(1000) });
        assert!(!allow_activation(
            Level::Extreme,
            ActivationRequest {
                user_time: UserTime::Timestamp(5000),
                is_transient_descendant_of_active: false,
                focus_in: false,
            },
            active,
            false,
        ));
    }
}
