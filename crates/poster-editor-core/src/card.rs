//! Pattern cards and the deck that owns them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{format_card_date, normalize_card_date};
use crate::error::UserInputError;
use crate::types::{CardId, Field};

/// One poster entry: a sentence pattern, its examples, and a date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternCard {
    pub id: CardId,
    pub pattern_text: String,
    /// Styled markup; when present it wins over `pattern_text` on render.
    pub pattern_markup: Option<String>,
    pub examples_text: String,
    pub examples_markup: Option<String>,
    pub date: String,
}

impl PatternCard {
    pub fn new(id: CardId, today: NaiveDate) -> Self {
        Self {
            id,
            pattern_text: String::new(),
            pattern_markup: None,
            examples_text: String::new(),
            examples_markup: None,
            date: format_card_date(today),
        }
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Pattern => &self.pattern_text,
            Field::Examples => &self.examples_text,
        }
    }

    pub fn markup(&self, field: Field) -> Option<&str> {
        match field {
            Field::Pattern => self.pattern_markup.as_deref(),
            Field::Examples => self.examples_markup.as_deref(),
        }
    }

    pub fn set_markup(&mut self, field: Field, markup: Option<String>) {
        match field {
            Field::Pattern => self.pattern_markup = markup,
            Field::Examples => self.examples_markup = markup,
        }
    }

    fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Pattern => &mut self.pattern_text,
            Field::Examples => &mut self.examples_text,
        }
    }

    /// Layout size derived from the amount of text on the card.
    pub fn size(&self) -> CardSize {
        let len = self.pattern_text.encode_utf16().count() + self.examples_text.encode_utf16().count();
        CardSize::from_text_len(len)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardSize {
    Small,
    Medium,
    Large,
    Xl,
}

impl CardSize {
    pub fn from_text_len(len: usize) -> Self {
        match len {
            0..50 => CardSize::Small,
            50..100 => CardSize::Medium,
            100..200 => CardSize::Large,
            _ => CardSize::Xl,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            CardSize::Small => "size-small",
            CardSize::Medium => "size-medium",
            CardSize::Large => "size-large",
            CardSize::Xl => "size-xl",
        }
    }
}

/// Between one and `max_cards` cards, ids assigned monotonically.
#[derive(Clone, Debug)]
pub struct CardDeck {
    cards: Vec<PatternCard>,
    next_id: u32,
    max_cards: usize,
}

impl CardDeck {
    /// A deck holding one empty card dated `today`.
    pub fn new(max_cards: usize, today: NaiveDate) -> Self {
        let mut deck = Self {
            cards: Vec::new(),
            next_id: 1,
            max_cards: max_cards.max(1),
        };
        deck.push_fresh(today);
        deck
    }

    fn push_fresh(&mut self, today: NaiveDate) -> CardId {
        let id = CardId(self.next_id);
        self.next_id += 1;
        self.cards.push(PatternCard::new(id, today));
        id
    }

    pub fn add_card(&mut self, today: NaiveDate) -> Result<CardId, UserInputError> {
        if self.cards.len() >= self.max_cards {
            return Err(UserInputError::CardLimit(self.max_cards));
        }
        let id = self.push_fresh(today);
        tracing::debug!(target: "poster::cards", %id, count = self.cards.len(), "card added");
        Ok(id)
    }

    pub fn delete_card(&mut self, id: CardId) -> Result<PatternCard, UserInputError> {
        let index = self
            .cards
            .iter()
            .position(|card| card.id == id)
            .ok_or(UserInputError::UnknownCard(id))?;
        if self.cards.len() <= 1 {
            return Err(UserInputError::LastCard);
        }
        tracing::debug!(target: "poster::cards", %id, "card deleted");
        Ok(self.cards.remove(index))
    }

    pub fn get(&self, id: CardId) -> Option<&PatternCard> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn get_mut(&mut self, id: CardId) -> Option<&mut PatternCard> {
        self.cards.iter_mut().find(|card| card.id == id)
    }

    pub fn cards(&self) -> &[PatternCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn max_cards(&self) -> usize {
        self.max_cards
    }

    /// Replace every card with one fresh card; ids start over.
    pub fn clear_all(&mut self, today: NaiveDate) -> CardId {
        self.cards.clear();
        self.next_id = 1;
        self.push_fresh(today)
    }

    /// Store trimmed text for a field. Returns whether the text changed, in
    /// which case the field's markup has been dropped.
    pub fn save_text(&mut self, id: CardId, field: Field, text: &str) -> Result<bool, UserInputError> {
        let card = self.get_mut(id).ok_or(UserInputError::UnknownCard(id))?;
        let trimmed = text.trim();
        if card.text(field) == trimmed {
            return Ok(false);
        }
        *card.text_mut(field) = trimmed.to_string();
        card.set_markup(field, None);
        tracing::debug!(target: "poster::cards", %id, ?field, "text changed, markup invalidated");
        Ok(true)
    }

    pub fn save_pattern(&mut self, id: CardId, text: &str) -> Result<bool, UserInputError> {
        self.save_text(id, Field::Pattern, text)
    }

    pub fn save_examples(&mut self, id: CardId, text: &str) -> Result<bool, UserInputError> {
        self.save_text(id, Field::Examples, text)
    }

    /// Validate and store a date, normalized to `YY.MM.DD (Ddd)`.
    pub fn save_date(&mut self, id: CardId, text: &str) -> Result<(), UserInputError> {
        let date = normalize_card_date(text)?;
        let card = self.get_mut(id).ok_or(UserInputError::UnknownCard(id))?;
        card.date = date;
        Ok(())
    }
}
