use super::Role;

/// Playable agents grouped by the role they fill
pub fn agents_for_role(role: Role) -> &'static [&'static str] {
    match role {
        Role::Duelist => &["Jett", "Reyna", "Raze", "Neon", "Yoru", "Iso", "Waylay", "Phoenix"],
        Role::Initiator => &["Sova", "Breach", "Skye", "KAY/O", "Fade", "Gekko", "Tejo"],
        Role::Controller => &["Brimstone", "Omen", "Viper", "Astra", "Harbor", "Clove"],
        Role::Sentinel => &["Sage", "Cypher", "Killjoy", "Chamber", "Deadlock", "Vyse", "Veto"],
    }
}

/// Role an agent belongs to, if it is on the roster
pub fn role_of(agent: &str) -> Option<Role> {
    Role::ALL
        .into_iter()
        .find(|role| agents_for_role(*role).contains(&agent))
}
