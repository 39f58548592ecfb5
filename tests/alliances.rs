use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;

use raid_guard::testutil::FakeHost;
use raid_guard::{AllianceCommand, AllianceError, AllianceRegistry, GuardConfig, RaidGuard};

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn clan_invite_with_leader_consent() {
    let config = GuardConfig {
        alliances: true,
        clan_based_alliances: true,
        max_alliance_size: 3,
        ..GuardConfig::default()
    };
    let host = FakeHost::new();
    let solo = host.add_clan(1, "Solo");
    let crew = host.add_clan(2, "Crew");
    let owner = host.add_player(1, "Owner", Some(solo));
    let leader = host.add_player(2, "Leader", Some(crew));
    host.add_player(3, "Second", Some(crew));
    let registry = AllianceRegistry::in_memory(&config);

    assert_eq!(registry.toggle_recruitable(&host, leader), Ok(true));
    let recruited = registry.invite(&host, owner, "crew").unwrap();

    assert_eq!(recruited.members, names(&["Owner", "Leader", "Second"]));
    assert_eq!(registry.group(owner), Some(names(&["Owner", "Leader", "Second"])));
    assert!(!registry.is_recruitable(leader));
}

#[test]
fn unconsenting_player_is_refused_without_mutation() {
    let config = GuardConfig {
        alliances: true,
        ..GuardConfig::default()
    };
    let host = FakeHost::new();
    let owner = host.add_player(1, "Owner", None);
    let target = host.add_player(2, "Target", None);
    let registry = AllianceRegistry::in_memory(&config);
    registry.on_player_connected(target);
    let before = registry.snapshot();

    assert_eq!(
        registry.invite(&host, owner, "Target"),
        Err(AllianceError::NotEligible {
            name: "Target".into()
        })
    );
    assert_eq!(registry.snapshot(), before);
}

#[test]
fn groups_and_flags_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = GuardConfig {
        alliances: true,
        data_dir: dir.path().to_path_buf(),
        ..GuardConfig::default()
    };
    let host = Arc::new(FakeHost::new());
    let owner = host.add_player(1, "Owner", None);
    let ally = host.add_player(2, "Ally", None);
    let late = host.add_player(3, "Late", None);

    {
        let guard = RaidGuard::new(
            host.clone(),
            config.clone(),
            Arc::new(AllianceRegistry::open(&config)),
        );
        guard.execute_command(ally, &AllianceCommand::ToggleRecruitable);
        guard.execute_command(late, &AllianceCommand::ToggleRecruitable);
        guard.execute_command(owner, &AllianceCommand::Add("Ally".into()));
    }

    let reopened = AllianceRegistry::open(&config);
    assert_eq!(reopened.group(owner), Some(names(&["Owner", "Ally"])));
    assert!(!reopened.is_recruitable(ally));
    assert!(reopened.is_recruitable(late));
}

#[test]
fn malformed_and_empty_stores_load_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("player_alliances.json"), "{ not json").unwrap();
    fs::write(dir.path().join("player_bools.json"), "   \n").unwrap();
    let config = GuardConfig {
        alliances: true,
        data_dir: dir.path().to_path_buf(),
        ..GuardConfig::default()
    };

    let registry = AllianceRegistry::open(&config);
    assert!(registry.snapshot().groups.is_empty());
    assert!(registry.snapshot().bools.is_empty());
}

#[test]
fn missing_stores_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("Alliances");
    let config = GuardConfig {
        alliances: true,
        data_dir: data_dir.clone(),
        ..GuardConfig::default()
    };

    let registry = AllianceRegistry::open(&config);
    assert!(registry.snapshot().groups.is_empty());
    assert!(data_dir.join("player_alliances.json").exists());
    assert!(data_dir.join("player_bools.json").exists());
}

#[test]
fn group_never_exceeds_cap() {
    let config = GuardConfig {
        alliances: true,
        max_alliance_size: 3,
        ..GuardConfig::default()
    };
    let host = FakeHost::new();
    let owner = host.add_player(1, "Owner", None);
    let registry = AllianceRegistry::in_memory(&config);
    for (raw, name) in [(2, "A"), (3, "B"), (4, "C"), (5, "D")] {
        let id = host.add_player(raw, name, None);
        registry.toggle_recruitable(&host, id).unwrap();
        let _ = registry.invite(&host, owner, name);
        assert!(registry.group(owner).unwrap_or_default().len() <= 3);
    }
    assert_eq!(registry.group(owner), Some(names(&["Owner", "A", "B"])));
    assert!(registry.is_recruitable(host_id(&host, "C")));
}

fn host_id(host: &FakeHost, name: &str) -> raid_guard::PlayerId {
    use raid_guard::HostWorld;
    host.find_player(name).map(|p| p.id).unwrap()
}
