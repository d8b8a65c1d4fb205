//! The stock condition set shipped with the game.

use nr_core::{Condition, DeathReason, WinLevel};

/// Win grades S to C and the three attribute deaths.
pub fn standard_conditions() -> Vec<Condition> {
    vec![
        Condition::win(
            "win_s",
            WinLevel::S,
            "day >= 7 && attributes.health >= 80 && attributes.sanity >= 80 && inventory.includes(\"golden_key\")",
        )
        .with_priority(100)
        .with_description("Perfect clear: survive seven days in top shape with the golden key")
        .with_message("Congratulations! You cleared the game flawlessly!"),
        Condition::win(
            "win_a",
            WinLevel::A,
            "day >= 7 && attributes.health >= 60 && attributes.sanity >= 60",
        )
        .with_priority(90)
        .with_description("Great clear: survive seven days in good shape")
        .with_message("Well done! You made it through!"),
        Condition::win("win_b", WinLevel::B, "day >= 7")
            .with_priority(80)
            .with_description("Clear: survive seven days")
            .with_message("You barely made it through."),
        Condition::win("win_c", WinLevel::C, "day >= 5 && attributes.health > 0")
            .with_priority(70)
            .with_description("Minimal clear: survive five days")
            .with_message("You cleared the game by the narrowest margin."),
        Condition::death("death_health", "attributes.health <= 0")
            .with_reason(DeathReason::HealthZero)
            .with_priority(1000)
            .with_description("Health reached zero")
            .with_message("Your life has come to an end..."),
        Condition::death("death_sanity", "attributes.sanity <= 0")
            .with_reason(DeathReason::SanityZero)
            .with_priority(1000)
            .with_description("Sanity reached zero")
            .with_message("Your mind has shattered..."),
        Condition::death("death_hunger", "attributes.hunger <= 0")
            .with_reason(DeathReason::HungerZero)
            .with_priority(1000)
            .with_description("Starved")
            .with_message("You starved to death..."),
    ]
}
