//! Migration logic for generating the players table
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Players::GameVersion).string().not_null())
                    .col(ColumnDef::new(Players::GameUpdate).string().not_null())
                    .col(ColumnDef::new(Players::Gender).string_len(1).not_null())
                    .col(
                        ColumnDef::new(Players::PlayerFaceUrl)
                            .string()
                            .default("")
                            .not_null(),
                    )
                    .col(ColumnDef::new(Players::LongName).string().not_null())
                    .col(ColumnDef::new(Players::ShortName).string().not_null())
                    .col(ColumnDef::new(Players::PlayerPositions).string().not_null())
                    .col(ColumnDef::new(Players::ClubName).string().null())
                    .col(ColumnDef::new(Players::NationalityName).string().null())
                    .col(ColumnDef::new(Players::Overall).integer().not_null())
                    .col(ColumnDef::new(Players::Potential).integer().not_null())
                    .col(ColumnDef::new(Players::ValueEur).big_integer().null())
                    .col(ColumnDef::new(Players::WageEur).big_integer().null())
                    .col(ColumnDef::new(Players::Age).integer().not_null())
                    .col(ColumnDef::new(Players::HeightCm).integer().null())
                    .col(ColumnDef::new(Players::WeightKg).integer().null())
                    .col(ColumnDef::new(Players::PreferredFoot).string().null())
                    .col(ColumnDef::new(Players::WeakFoot).integer().null())
                    .col(ColumnDef::new(Players::SkillMoves).integer().null())
                    .col(
                        ColumnDef::new(Players::InternationalReputation)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Players::WorkRate).string().null())
                    .col(ColumnDef::new(Players::BodyType).string().null())
                    // Face stats
                    .col(ColumnDef::new(Players::Pace).integer().null())
                    .col(ColumnDef::new(Players::Shooting).integer().null())
                    .col(ColumnDef::new(Players::Passing).integer().null())
                    .col(ColumnDef::new(Players::Dribbling).integer().null())
                    .col(ColumnDef::new(Players::Defending).integer().null())
                    .col(ColumnDef::new(Players::Physic).integer().null())
                    // Attacking
                    .col(ColumnDef::new(Players::AttackingCrossing).integer().null())
                    .col(ColumnDef::new(Players::AttackingFinishing).integer().null())
                    .col(
                        ColumnDef::new(Players::AttackingHeadingAccuracy)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Players::AttackingShortPassing)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Players::AttackingVolleys).integer().null())
                    // Skill
                    .col(ColumnDef::new(Players::SkillDribbling).integer().null())
                    .col(ColumnDef::new(Players::SkillCurve).integer().null())
                    .col(ColumnDef::new(Players::SkillFkAccuracy).integer().null())
                    .col(ColumnDef::new(Players::SkillLongPassing).integer().null())
                    .col(ColumnDef::new(Players::SkillBallControl).integer().null())
                    // Movement
                    .col(
                        ColumnDef::new(Players::MovementAcceleration)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Players::MovementSprintSpeed)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Players::MovementAgility).integer().null())
                    .col(ColumnDef::new(Players::MovementReactions).integer().null())
                    .col(ColumnDef::new(Players::MovementBalance).integer().null())
                    // Power
                    .col(ColumnDef::new(Players::PowerShotPower).integer().null())
                    .col(ColumnDef::new(Players::PowerJumping).integer().null())
                    .col(ColumnDef::new(Players::PowerStamina).integer().null())
                    .col(ColumnDef::new(Players::PowerStrength).integer().null())
                    .col(ColumnDef::new(Players::PowerLongShots).integer().null())
                    // Mentality
                    .col(
                        ColumnDef::new(Players::MentalityAggression)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Players::MentalityInterceptions)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Players::MentalityPositioning)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Players::MentalityVision).integer().null())
                    .col(ColumnDef::new(Players::MentalityPenalties).integer().null())
                    .col(ColumnDef::new(Players::MentalityComposure).integer().null())
                    // Defending
                    .col(ColumnDef::new(Players::DefendingMarking).integer().null())
                    .col(
                        ColumnDef::new(Players::DefendingStandingTackle)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Players::DefendingSlidingTackle)
                            .integer()
                            .null(),
                    )
                    // Goalkeeping
                    .col(ColumnDef::new(Players::GoalkeepingDiving).integer().null())
                    .col(ColumnDef::new(Players::GoalkeepingHandling).integer().null())
                    .col(ColumnDef::new(Players::GoalkeepingKicking).integer().null())
                    .col(
                        ColumnDef::new(Players::GoalkeepingPositioning)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Players::GoalkeepingReflexes).integer().null())
                    .col(ColumnDef::new(Players::GoalkeepingSpeed).integer().null())
                    .col(ColumnDef::new(Players::PlayerTraits).string().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Players {
    Table,
    Id,
    GameVersion,
    GameUpdate,
    Gender,
    PlayerFaceUrl,
    LongName,
    ShortName,
    PlayerPositions,
    ClubName,
    NationalityName,
    Overall,
    Potential,
    ValueEur,
    WageEur,
    Age,
    HeightCm,
    WeightKg,
    PreferredFoot,
    WeakFoot,
    SkillMoves,
    InternationalReputation,
    WorkRate,
    BodyType,
    Pace,
    Shooting,
    Passing,
    Dribbling,
    Defending,
    Physic,
    AttackingCrossing,
    AttackingFinishing,
    AttackingHeadingAccuracy,
    AttackingShortPassing,
    AttackingVolleys,
    SkillDribbling,
    SkillCurve,
    SkillFkAccuracy,
    SkillLongPassing,
    SkillBallControl,
    MovementAcceleration,
    MovementSprintSpeed,
    MovementAgility,
    MovementReactions,
    MovementBalance,
    PowerShotPower,
    PowerJumping,
    PowerStamina,
    PowerStrength,
    PowerLongShots,
    MentalityAggression,
    MentalityInterceptions,
    MentalityPositioning,
    MentalityVision,
    MentalityPenalties,
    MentalityComposure,
    DefendingMarking,
    DefendingStandingTackle,
    DefendingSlidingTackle,
    GoalkeepingDiving,
    GoalkeepingHandling,
    GoalkeepingKicking,
    GoalkeepingPositioning,
    GoalkeepingReflexes,
    GoalkeepingSpeed,
    PlayerTraits,
}
