use nstree_core::*;
use std::collections::HashSet;

#[test]
fn test_namespace_id_equality() {
    let a = NamespaceId::new(4, 4_026_531_836);
    let b = NamespaceId::new(4, 4_026_531_836);
    let c = NamespaceId::new(5, 4_026_531_836);

    assert_eq!(a, b);
    assert_ne!(a, c);

    let set: HashSet<_> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_namespace_id_serialization() {
    let id = NamespaceId::new(4, 4_026_532_200);

    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, r#"{"device":4,"inode":4026532200}"#);

    let deserialized: NamespaceId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

#[test]
fn test_namespace_id_round_trips_through_display() {
    for id in [
        NamespaceId::new(0, 0),
        NamespaceId::new(4, 4_026_531_836),
        NamespaceId::new(u64::MAX, u64::MAX),
    ] {
        assert_eq!(id.to_string().parse::<NamespaceId>().unwrap(), id);
    }
}

#[test]
fn test_namespace_kind_proc_entries() {
    assert_eq!(NamespaceKind::default(), NamespaceKind::Pid);
    assert_eq!(NamespaceKind::Pid.proc_entry(), "pid");
    assert_eq!(NamespaceKind::User.proc_entry(), "user");

    for kind in NamespaceKind::ALL {
        assert_eq!(kind.to_string().parse::<NamespaceKind>().unwrap(), kind);
    }
}

#[test]
fn test_process_id_ordering() {
    let mut pids = vec![
        ProcessId::from_raw(300),
        ProcessId::from_raw(2),
        ProcessId::from_raw(41),
    ];
    pids.sort();

    let raw: Vec<i32> = pids.iter().map(|p| p.as_raw()).collect();
    assert_eq!(raw, vec![2, 41, 300]);
}

#[test]
fn test_invalid_kind_is_config_error() {
    let err = "mnt".parse::<NamespaceKind>().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
    assert!(err.to_string().contains("mnt"));
}
