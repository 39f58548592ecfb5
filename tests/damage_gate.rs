mod common;

use raid_guard::{
    AllianceCommand, DamageEvent, DamageKind, DamageTarget, DamageVerdict, EngineId, GuardConfig,
    PlayerId, VetoReason,
};

use common::{raid_config, siege};

fn hit(attacker: PlayerId, target: PlayerId) -> DamageEvent {
    DamageEvent {
        attacker,
        attacker_engine: None,
        target: DamageTarget::Player {
            id: target,
            engine: None,
        },
        kind: DamageKind::Physical,
    }
}

#[test]
fn allies_cannot_damage_each_other() {
    let s = siege(GuardConfig {
        alliances: true,
        prevent_friendly_fire: true,
        ..GuardConfig::default()
    });
    let friend = s.host.add_player(3, "Friend", None);
    s.guard
        .execute_command(friend, &AllianceCommand::ToggleRecruitable);
    assert_eq!(
        s.guard
            .execute_command(s.owner, &AllianceCommand::Add("Friend".into())),
        "Friend added to alliance."
    );

    assert_eq!(
        s.guard.on_damage_event(&hit(friend, s.owner)),
        DamageVerdict::Veto(VetoReason::FriendlyFire)
    );
    assert_eq!(s.guard.on_damage_event(&hit(s.raider, s.owner)), DamageVerdict::Allow);

    s.guard.execute_command(friend, &AllianceCommand::Leave);
    assert_eq!(s.guard.on_damage_event(&hit(friend, s.owner)), DamageVerdict::Allow);
}

#[test]
fn raid_participants_are_shielded_from_outsiders() {
    let s = siege(GuardConfig {
        block_outside_damage: true,
        ..raid_config()
    });
    let outsider = s.host.add_player(3, "Outsider", None);
    assert_eq!(
        s.guard.on_damage_event(&hit(outsider, s.raider)),
        DamageVerdict::Allow
    );

    s.guard.on_siege_breached(s.raider, s.castle, true);
    assert_eq!(
        s.guard.on_damage_event(&hit(outsider, s.raider)),
        DamageVerdict::Veto(VetoReason::ThirdParty)
    );
    assert_eq!(s.guard.on_damage_event(&hit(s.owner, s.raider)), DamageVerdict::Allow);
}

#[test]
fn engine_protection_follows_the_raid() {
    let s = siege(GuardConfig {
        golem_guard: true,
        ..raid_config()
    });
    let outsider = s.host.add_player(3, "Outsider", None);
    let engine = EngineId(50);
    let engine_hit = DamageEvent {
        attacker: s.raider,
        attacker_engine: Some(engine),
        target: DamageTarget::Structure(s.castle),
        kind: DamageKind::Physical,
    };
    let on_engine = |attacker| DamageEvent {
        attacker,
        attacker_engine: None,
        target: DamageTarget::Player {
            id: s.raider,
            engine: Some(engine),
        },
        kind: DamageKind::Physical,
    };

    // Before the breach: short window, defenders may fight back.
    s.guard.on_damage_event(&engine_hit);
    assert!(s.guard.on_damage_event(&on_engine(outsider)).is_veto());
    assert!(!s.guard.on_damage_event(&on_engine(s.owner)).is_veto());
    s.host.advance_secs(s.guard.config().golem_attack_protection_secs);
    assert!(!s.guard.on_damage_event(&on_engine(outsider)).is_veto());

    // After the breach: longer window.
    s.guard.on_siege_breached(s.raider, s.castle, true);
    s.guard.on_damage_event(&engine_hit);
    s.host.advance_secs(s.guard.config().golem_attack_protection_secs + 1);
    assert_eq!(
        s.guard.on_damage_event(&on_engine(outsider)),
        DamageVerdict::Veto(VetoReason::ProtectedEngine)
    );
    s.host.advance_secs(s.guard.config().golem_breached_protection_secs);
    assert_eq!(s.guard.on_damage_event(&on_engine(outsider)), DamageVerdict::Allow);
}
