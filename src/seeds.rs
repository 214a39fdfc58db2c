//! Built-in seed questions and related helpers.

use crate::domain::{Choice, Question, QuestionSource, QuestionType};

fn choice(key: &str, text: &str) -> Choice {
  Choice { key: key.into(), text: text.into() }
}

fn mc(id: &str, category: &str, stem: &str, choices: Vec<Choice>, answer: &str) -> Question {
  Question {
    id: id.into(),
    index: 0,
    question_type: QuestionType::MultipleChoice,
    category: category.into(),
    stem: stem.into(),
    choices,
    answer: answer.into(),
    media: None,
    source: QuestionSource::Seed,
  }
}

fn grid_in(id: &str, category: &str, stem: &str, answer: &str) -> Question {
  Question {
    id: id.into(),
    index: 0,
    question_type: QuestionType::GridIn,
    category: category.into(),
    stem: stem.into(),
    choices: vec![],
    answer: answer.into(),
    media: None,
    source: QuestionSource::Seed,
  }
}

/// Minimal built-in bank so the app is useful even without external config.
/// Covers every topic bucket and both question types.
pub fn seed_questions() -> Vec<Question> {
  vec![
    mc(
      "seed-alg-linear",
      "Equations",
      "If 3x − 7 = 14, what is the value of x?",
      vec![choice("A", "5"), choice("B", "7"), choice("C", "9"), choice("D", "21")],
      "B",
    ),
    mc(
      "seed-alg-ratio",
      "Ratios",
      "The ratio of red to blue marbles in a jar is 3:5. If the jar holds 40 marbles, how many are blue?",
      vec![choice("A", "15"), choice("B", "20"), choice("C", "25"), choice("D", "30")],
      "C",
    ),
    mc(
      "seed-alg-percent",
      "Percents",
      "A jacket priced at $80 is on sale for 15% off. What is the sale price, in dollars?",
      vec![choice("A", "65"), choice("B", "68"), choice("C", "72"), choice("D", "76")],
      "B",
    ),
    mc(
      "seed-alg-inequality",
      "Inequalities",
      "Which value of x satisfies 2x + 3 < 9?",
      vec![choice("A", "2"), choice("B", "3"), choice("C", "4"), choice("D", "5")],
      "A",
    ),
    grid_in(
      "seed-alg-equation",
      "Equations",
      "If 2(x + 3) = 18, what is the value of x?",
      "6",
    ),
    mc(
      "seed-geo-perimeter",
      "Geometry",
      "A rectangle has a length of 12 and a width of 5. What is its perimeter?",
      vec![choice("A", "17"), choice("B", "34"), choice("C", "60"), choice("D", "24")],
      "B",
    ),
    mc(
      "seed-geo-surface",
      "Surface Area",
      "A rectangular box measures 3 by 4 by 5. What is its total surface area?",
      vec![choice("A", "47"), choice("B", "60"), choice("C", "94"), choice("D", "120")],
      "C",
    ),
    grid_in(
      "seed-geo-volume",
      "Volume",
      "What is the volume of a cube with edge length 4?",
      "64",
    ),
    mc(
      "seed-stats-median",
      "MMMR",
      "What is the median of the data set {3, 7, 9, 15, 21}?",
      vec![choice("A", "7"), choice("B", "9"), choice("C", "11"), choice("D", "15")],
      "B",
    ),
    mc(
      "seed-stats-combinations",
      "Combinations",
      "How many different two-letter codes can be formed from the letters A, B, C and D if no letter repeats?",
      vec![choice("A", "6"), choice("B", "8"), choice("C", "12"), choice("D", "16")],
      "C",
    ),
    grid_in(
      "seed-stats-probability",
      "Probability",
      "A bag holds 3 red and 7 green marbles. One marble is drawn at random. What is the probability that it is red?",
      "3/10",
    ),
    mc(
      "seed-other-prime",
      "Number Properties",
      "Which of the following is a prime number?",
      vec![choice("A", "21"), choice("B", "27"), choice("C", "29"), choice("D", "33")],
      "C",
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::classify::bucket_of;
  use crate::domain::Bucket;

  #[test]
  fn seeds_have_unique_ids_and_cover_every_bucket() {
    let seeds = seed_questions();
    let mut ids: Vec<&str> = seeds.iter().map(|q| q.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), seeds.len());
    for bucket in [Bucket::Algebra, Bucket::Geometry, Bucket::StatsProb, Bucket::Other] {
      assert!(
        seeds.iter().any(|q| bucket_of(q) == bucket),
        "no seed question for {bucket:?}"
      );
    }
    assert!(seeds.iter().any(|q| q.question_type == QuestionType::GridIn));
  }

  #[test]
  fn multiple_choice_seeds_answer_with_an_existing_key() {
    for q in seed_questions() {
      if q.question_type == QuestionType::MultipleChoice {
        assert!(
          q.choices.iter().any(|c| c.key == q.answer),
          "seed {} answers with a key not among its choices",
          q.id
        );
      }
    }
  }
}
