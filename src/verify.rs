//! Decide whether the caller may grant each requested range.

use log::debug;

use crate::err::*;
use crate::ranges::{MapKind, MapRange};
use crate::subid::Registry;
use crate::target::CallerIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthResult {
    /// The range lies inside one of the caller's delegations.
    RegistryAuthorized,
    /// The caller mapping its own single real id.
    SelfMapping,
    Rejected,
}

/// Whether any range came from a real delegation.  If so, the target
/// keeps control of its own setgroups policy; otherwise it is forced
/// to "deny".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetgroupsDecision {
    any_registry_authorized: bool,
}

impl SetgroupsDecision {
    pub fn allow_setgroups(&self) -> bool {
        self.any_registry_authorized
    }

    fn record(&mut self, result: AuthResult) {
        if result == AuthResult::RegistryAuthorized {
            self.any_registry_authorized = true;
        }
    }
}

pub fn verify_range(registry: &Registry, caller: &CallerIdentity,
                    kind: MapKind, range: &MapRange) -> AuthResult {
    if range.count == 0 {
        return AuthResult::Rejected;
    }
    if registry.contains(&caller.name, caller.pw_uid, range.host_id, range.count) {
        return AuthResult::RegistryAuthorized;
    }
    if range.count == 1 && range.host_id == caller.real_id(kind) {
        return AuthResult::SelfMapping;
    }
    AuthResult::Rejected
}

/// Check every range before anything is written.  The first rejected
/// range fails the whole request.
pub fn verify_ranges(registry: &Registry, caller: &CallerIdentity,
                     kind: MapKind, ranges: &[MapRange])
                     -> Result<SetgroupsDecision, Error> {
    let mut decision = SetgroupsDecision::default();
    for range in ranges {
        let result = verify_range(registry, caller, kind, range);
        debug!("{} range {}: {:?}", kind, range, result);
        if result == AuthResult::Rejected {
            return Err(Error::RangeNotAllowed { kind, range: *range });
        }
        decision.record(result);
    }
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use proptest::prelude::*;

    fn registry(text: &str) -> Registry {
        Registry::load(Path::new("subgid"), text.as_bytes()).unwrap()
    }

    fn alice() -> CallerIdentity {
        CallerIdentity {
            uid: 1000, gid: 1001, pw_uid: 1000, pw_gid: 1001,
            name: String::from("alice"),
        }
    }

    fn range(ns_id: u32, host_id: u32, count: u32) -> MapRange {
        MapRange { ns_id, host_id, count }
    }

    #[test]
    fn delegated_range_is_registry_authorized() {
        let r = registry("alice:100000:65536\n");
        assert_eq!(verify_range(&r, &alice(), MapKind::Gid, &range(0, 100000, 65536)),
                   AuthResult::RegistryAuthorized);
    }

    #[test]
    fn self_mapping_uses_the_id_for_the_kind() {
        let r = registry("");
        let c = alice();
        assert_eq!(verify_range(&r, &c, MapKind::Gid, &range(0, 1001, 1)),
                   AuthResult::SelfMapping);
        assert_eq!(verify_range(&r, &c, MapKind::Gid, &range(0, 1000, 1)),
                   AuthResult::Rejected);
        assert_eq!(verify_range(&r, &c, MapKind::Uid, &range(0, 1000, 1)),
                   AuthResult::SelfMapping);
        assert_eq!(verify_range(&r, &c, MapKind::Gid, &range(0, 1001, 2)),
                   AuthResult::Rejected);
    }

    #[test]
    fn someone_elses_range_is_rejected() {
        let r = registry("bob:200000:65536\n");
        assert_eq!(verify_range(&r, &alice(), MapKind::Gid, &range(0, 200000, 10)),
                   AuthResult::Rejected);
    }

    #[test]
    fn self_mapping_does_not_allow_setgroups() {
        let r = registry("alice:100000:65536\n");
        let d = verify_ranges(&r, &alice(), MapKind::Gid, &[range(0, 1001, 1)]).unwrap();
        assert!(!d.allow_setgroups());

        let d = verify_ranges(&r, &alice(), MapKind::Gid,
                              &[range(0, 1001, 1), range(1, 100000, 65536)]).unwrap();
        assert!(d.allow_setgroups());
    }

    #[test]
    fn first_rejection_names_the_range() {
        let r = registry("alice:100000:65536\n");
        let err = verify_ranges(&r, &alice(), MapKind::Gid,
                                &[range(0, 100000, 65536), range(65536, 2000, 2)])
            .unwrap_err();
        assert_eq!(err.to_string(), "gid range [65536-65538) -> [2000-2002) not allowed");
    }

    proptest! {
        #[test]
        fn self_maps_never_flip_the_decision(ns in prop::collection::vec(0u32..1_000_000, 1..8)) {
            let r = registry("alice:100000:65536\n");
            let ranges: Vec<MapRange> = ns.iter().map(|&n| range(n, 1001, 1)).collect();
            let d = verify_ranges(&r, &alice(), MapKind::Gid, &ranges).unwrap();
            prop_assert!(!d.allow_setgroups());
        }

        #[test]
        fn one_bad_range_spoils_the_batch(pos in 0usize..4, host in 300_000u32..400_000,
                                          count in 2u32..100) {
            let r = registry("alice:100000:65536\n");
            let mut ranges = vec![range(0, 100000, 100); 4];
            ranges.insert(pos, range(500, host, count));
            let err = verify_ranges(&r, &alice(), MapKind::Gid, &ranges).unwrap_err();
            prop_assert_eq!(err.category(), Category::Permission);
        }
    }
}
