use serde::{Deserialize, Serialize};

/// Job positions a worker can be billed/paid under. One canonical enum shared
/// by employees, payroll and billing so the label set cannot drift between
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Service,
    Driver,
    Security,
    CleaningService,
    Operator,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::Service,
        Position::Driver,
        Position::Security,
        Position::CleaningService,
        Position::Operator,
    ];

    /// Human-readable label for exports and summaries.
    pub fn display_name(&self) -> &'static str {
        match self {
            Position::Service => "Service",
            Position::Driver => "Driver",
            Position::Security => "Security",
            Position::CleaningService => "Cleaning Service",
            Position::Operator => "Operator",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Service => write!(f, "service"),
            Position::Driver => write!(f, "driver"),
            Position::Security => write!(f, "security"),
            Position::CleaningService => write!(f, "cleaning_service"),
            Position::Operator => write!(f, "operator"),
        }
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "service" => Ok(Position::Service),
            "driver" => Ok(Position::Driver),
            "security" => Ok(Position::Security),
            "cleaning_service" => Ok(Position::CleaningService),
            "operator" => Ok(Position::Operator),
            _ => Err(format!("Invalid position: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for Position {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Position {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.to_string();
        <String as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&s, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Position {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse::<Position>().map_err(|e| e.into())
    }
}
