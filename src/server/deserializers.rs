use serde::Deserialize;

/// Category a quiz draws from.
///
/// Clients send it as a number, a numeric string, or the `{"id": .., "type": ..}` object the
/// category listing renders. Id `0` and `"ALL"` select every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawQuizCategory")]
pub enum QuizCategory {
    All,
    Id(i64),
}

impl QuizCategory {
    pub fn id(self) -> Option<i64> {
        match self {
            QuizCategory::All => None,
            QuizCategory::Id(id) => Some(id),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuizCategory {
    Plain(RawId),
    Object { id: RawId },
}

impl TryFrom<RawQuizCategory> for QuizCategory {
    type Error = String;

    fn try_from(value: RawQuizCategory) -> Result<Self, Self::Error> {
        let id = match value {
            RawQuizCategory::Plain(id) | RawQuizCategory::Object { id } => id,
        };
        let id = match id {
            RawId::Number(id) => id,
            RawId::Text(text) if text.trim().eq_ignore_ascii_case("all") => return Ok(Self::All),
            RawId::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("Wrong value {text}, can not parse to category id"))?,
        };
        match id {
            0 => Ok(Self::All),
            id if id > 0 => Ok(Self::Id(id)),
            id => Err(format!("Wrong value {id}, category id can not be negative")),
        }
    }
}
