//! # Regime Selection
//!
//! A regime is the calculation strategy for one combination of installation
//! attributes. Selection is a total match over [`InstallationKey`]: every
//! combination either names a [`Regime`] or has none.
//!
//! | Regime | Attachment   | Loop at midspan | Height difference | Plane         | Clause |
//! |--------|--------------|-----------------|-------------------|---------------|--------|
//! | 1.1    | Suspended    | no              | no                | -             | 6.2    |
//! | 1.2    | Suspended    | no              | yes               | -             | 6.3    |
//! | 2.1    | Suspended    | yes             | no                | parallel      | 6.2.5  |
//! | 2.2    | Suspended    | yes             | no                | perpendicular | 6.2.5  |
//! | 2.3    | Suspended    | yes             | yes               | parallel      | 6.3    |
//! | 2.4    | Suspended    | yes             | yes               | perpendicular | 6.3    |
//! | 3.1    | Resting      | no              | no                | -             | 6.2    |
//! | 3.2    | Under-looped | no              | no                | -             | 6.2    |
//!
//! Only 1.1, 3.1 and 3.2 have a pipeline; the others are declared so that
//! they fail with a clear "not supported" error.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::input::{Attachment, Installation, LoopPlane};
use crate::errors::CalcError;

/// The attributes that decide the regime, loop plane normalized away when
/// there is no loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallationKey {
    pub attachment: Attachment,
    pub loop_at_midspan: bool,
    pub height_difference: bool,
    pub loop_plane: Option<LoopPlane>,
}

impl From<&Installation> for InstallationKey {
    fn from(installation: &Installation) -> Self {
        InstallationKey {
            attachment: installation.attachment,
            loop_at_midspan: installation.loop_at_midspan,
            height_difference: installation.height_difference,
            loop_plane: if installation.loop_at_midspan {
                installation.loop_plane
            } else {
                None
            },
        }
    }
}

fn yes_no(flag: bool) -> String {
    let answer = if flag { "yes" } else { "no" };
    answer.to_string()
}

impl InstallationKey {
    /// Error echoing this key
    pub fn unsupported(&self) -> CalcError {
        CalcError::UnsupportedRegime {
            attachment: self.attachment.to_string(),
            loop_at_midspan: yes_no(self.loop_at_midspan),
            height_difference: yes_no(self.height_difference),
            loop_plane: self
                .loop_plane
                .map_or_else(|| "not relevant".to_string(), |plane| plane.to_string()),
        }
    }
}

/// Calculation regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// 1.1 strained conductor, no loop, no height difference
    SuspendedPlain,
    /// 1.2 strained conductor with a height difference
    SuspendedHeightDifference,
    /// 2.1 loop at midspan, plane parallel
    SuspendedLoopParallel,
    /// 2.2 loop at midspan, plane perpendicular
    SuspendedLoopPerpendicular,
    /// 2.3 loop at midspan with height difference, plane parallel
    SuspendedLoopHeightParallel,
    /// 2.4 loop at midspan with height difference, plane perpendicular
    SuspendedLoopHeightPerpendicular,
    /// 3.1 resting on post insulators
    RestingPlain,
    /// 3.2 looped under post insulators
    UnderLoopedPlain,
}

/// How the conductor is held, as far as the pipeline formulas differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanSupport {
    /// Cord between tension chains; span `l`, deflection eq. (45)
    Strained,
    /// On post insulators; span `l_eff`, deflection eq. (44)
    Resting,
    /// As resting, with the 1.2 weight factor in r
    UnderLooped,
}

impl Regime {
    /// Regime for a key, `None` when no regime is declared for it.
    pub fn select(key: InstallationKey) -> Option<Regime> {
        use Attachment::*;
        use LoopPlane::*;
        match (key.attachment, key.loop_at_midspan, key.height_difference, key.loop_plane) {
            (Suspended, false, false, _) => Some(Regime::SuspendedPlain),
            (Suspended, false, true, _) => Some(Regime::SuspendedHeightDifference),
            (Suspended, true, false, Some(Parallel)) => Some(Regime::SuspendedLoopParallel),
            (Suspended, true, false, Some(Perpendicular)) => {
                Some(Regime::SuspendedLoopPerpendicular)
            }
            (Suspended, true, true, Some(Parallel)) => Some(Regime::SuspendedLoopHeightParallel),
            (Suspended, true, true, Some(Perpendicular)) => {
                Some(Regime::SuspendedLoopHeightPerpendicular)
            }
            (Suspended, true, _, None) => None,
            (Resting, false, false, _) => Some(Regime::RestingPlain),
            (UnderLooped, false, false, _) => Some(Regime::UnderLoopedPlain),
            (Resting | UnderLooped, _, _, _) => None,
            (LoopAtSpanEnd, _, _, _) => None,
        }
    }

    /// Case number of the regime, e.g. "1.1"
    pub fn code(&self) -> &'static str {
        match self {
            Regime::SuspendedPlain => "1.1",
            Regime::SuspendedHeightDifference => "1.2",
            Regime::SuspendedLoopParallel => "2.1",
            Regime::SuspendedLoopPerpendicular => "2.2",
            Regime::SuspendedLoopHeightParallel => "2.3",
            Regime::SuspendedLoopHeightPerpendicular => "2.4",
            Regime::RestingPlain => "3.1",
            Regime::UnderLoopedPlain => "3.2",
        }
    }

    /// Support model of an implemented regime, `None` for declared-only ones.
    pub fn support(&self) -> Option<SpanSupport> {
        match self {
            Regime::SuspendedPlain => Some(SpanSupport::Strained),
            Regime::RestingPlain => Some(SpanSupport::Resting),
            Regime::UnderLoopedPlain => Some(SpanSupport::UnderLooped),
            Regime::SuspendedHeightDifference
            | Regime::SuspendedLoopParallel
            | Regime::SuspendedLoopPerpendicular
            | Regime::SuspendedLoopHeightParallel
            | Regime::SuspendedLoopHeightPerpendicular => None,
        }
    }

    pub fn is_implemented(&self) -> bool {
        self.support().is_some()
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Regime::SuspendedPlain => "strained conductors without loop",
            Regime::SuspendedHeightDifference => "strained conductors with height difference",
            Regime::SuspendedLoopParallel => "loop at midspan, plane parallel",
            Regime::SuspendedLoopPerpendicular => "loop at midspan, plane perpendicular",
            Regime::SuspendedLoopHeightParallel => {
                "loop at midspan with height difference, plane parallel"
            }
            Regime::SuspendedLoopHeightPerpendicular => {
                "loop at midspan with height difference, plane perpendicular"
            }
            Regime::RestingPlain => "conductors resting on post insulators",
            Regime::UnderLoopedPlain => "conductors looped under post insulators",
        };
        write!(f, "{} {}", self.code(), description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(
        attachment: Attachment,
        loop_at_midspan: bool,
        height_difference: bool,
        plane: Option<LoopPlane>,
    ) -> InstallationKey {
        InstallationKey {
            attachment,
            loop_at_midspan,
            height_difference,
            loop_plane: plane,
        }
    }

    #[test]
    fn test_implemented_regimes() {
        assert_eq!(
            Regime::select(key(Attachment::Suspended, false, false, None)),
            Some(Regime::SuspendedPlain)
        );
        assert_eq!(
            Regime::select(key(Attachment::Resting, false, false, None)),
            Some(Regime::RestingPlain)
        );
        assert_eq!(
            Regime::select(key(Attachment::UnderLooped, false, false, None)),
            Some(Regime::UnderLoopedPlain)
        );
        for regime in [Regime::SuspendedPlain, Regime::RestingPlain, Regime::UnderLoopedPlain] {
            assert!(regime.is_implemented());
        }
    }

    #[test]
    fn test_declared_but_unimplemented() {
        let installation = key(Attachment::Suspended, true, true, Some(LoopPlane::Parallel));
        let regime = Regime::select(installation).unwrap();
        assert_eq!(regime, Regime::SuspendedLoopHeightParallel);
        assert!(!regime.is_implemented());
        assert_eq!(regime.code(), "2.3");
    }

    #[test]
    fn test_undeclared_combinations() {
        assert_eq!(Regime::select(key(Attachment::LoopAtSpanEnd, false, false, None)), None);
        assert_eq!(Regime::select(key(Attachment::Resting, false, true, None)), None);
        assert_eq!(Regime::select(key(Attachment::Suspended, true, false, None)), None);
    }

    #[test]
    fn test_loop_plane_ignored_without_loop() {
        let installation = Installation {
            attachment: Attachment::Suspended,
            loop_at_midspan: false,
            height_difference: false,
            loop_plane: Some(LoopPlane::Perpendicular),
        };
        let key = InstallationKey::from(&installation);
        assert_eq!(key.loop_plane, None);
        assert_eq!(Regime::select(key), Some(Regime::SuspendedPlain));
    }

    #[test]
    fn test_unsupported_error_echoes_key() {
        let err = key(Attachment::Resting, true, false, None).unsupported();
        match err {
            CalcError::UnsupportedRegime {
                attachment,
                loop_at_midspan,
                height_difference,
                loop_plane,
            } => {
                assert_eq!(attachment, "Resting");
                assert_eq!(loop_at_midspan, "yes");
                assert_eq!(height_difference, "no");
                assert_eq!(loop_plane, "not relevant");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
