use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::user::TravelStyle;

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisOption {
    pub text: &'static str,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisQuestion {
    pub id: u32,
    pub text: &'static str,
    pub options: Vec<DiagnosisOption>,
}

/// One chosen option index per question, in question order.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosisAnswers {
    pub answers: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisResult {
    pub style: TravelStyle,
    pub total_score: u32,
    pub description: &'static str,
    pub saved: bool,
}

const QUESTIONS: [(&str, [(&str, u32); 3]); 5] = [
    (
        "旅行のスケジュールは？",
        [("分刻みで詰め込む", 1), ("ある程度決める", 2), ("現地で気分で決める", 3)],
    ),
    (
        "予算の使い方は？",
        [("とにかく安く済ませたい", 1), ("バランス重視", 2), ("高くても良いものを", 3)],
    ),
    (
        "計画の立て方は？",
        [("徹底的にリサーチ", 2), ("ざっくり決める", 3), ("効率重視で最適化", 1)],
    ),
    (
        "食事のスタイルは？",
        [("安くて美味しいB級グルメ", 1), ("現地の人気店", 2), ("高級レストランやコース", 3)],
    ),
    (
        "現地での行動は？",
        [("観光名所を全制覇", 1), ("ゆったり散策", 3), ("体験やアクティビティ重視", 2)],
    ),
];

pub fn questions() -> Vec<DiagnosisQuestion> {
    QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, (text, options))| DiagnosisQuestion {
            id: index as u32 + 1,
            text,
            options: options
                .iter()
                .map(|&(text, score)| DiagnosisOption { text, score })
                .collect(),
        })
        .collect()
}

pub fn style_for_score(total: u32) -> TravelStyle {
    if total <= 8 {
        TravelStyle::FastAndCheap
    } else if total >= 13 {
        TravelStyle::LuxuryExperience
    } else {
        TravelStyle::ComfortablePlan
    }
}

/// Sums the chosen option scores. Every question must be answered once.
pub fn score_answers(answers: &[usize]) -> Result<u32, ApiError> {
    if answers.len() != QUESTIONS.len() {
        return Err(ApiError::BadRequest(format!(
            "Expected {} answers, got {}",
            QUESTIONS.len(),
            answers.len()
        )));
    }

    QUESTIONS
        .iter()
        .zip(answers)
        .map(|((_, options), &choice)| {
            options
                .get(choice)
                .map(|&(_, score)| score)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid option {}", choice)))
        })
        .sum()
}

pub fn diagnose(answers: &[usize]) -> Result<(TravelStyle, u32), ApiError> {
    let total = score_answers(answers)?;
    Ok((style_for_score(total), total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_split_three_styles() {
        assert_eq!(style_for_score(5), TravelStyle::FastAndCheap);
        assert_eq!(style_for_score(8), TravelStyle::FastAndCheap);
        assert_eq!(style_for_score(9), TravelStyle::ComfortablePlan);
        assert_eq!(style_for_score(12), TravelStyle::ComfortablePlan);
        assert_eq!(style_for_score(13), TravelStyle::LuxuryExperience);
    }

    #[test]
    fn option_scores_are_not_positional() {
        // Third question: "効率重視で最適化" is the cheapest answer.
        assert_eq!(score_answers(&[0, 0, 2, 0, 0]).unwrap(), 5);
        assert_eq!(
            diagnose(&[2, 2, 1, 2, 1]).unwrap(),
            (TravelStyle::LuxuryExperience, 15)
        );
    }

    #[test]
    fn incomplete_or_invalid_answers_are_rejected() {
        assert!(score_answers(&[0, 0, 0]).is_err());
        assert!(score_answers(&[0, 0, 0, 0, 3]).is_err());
    }

    #[test]
    fn questions_are_numbered_from_one() {
        let questions = questions();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[2].options[2].score, 1);
    }
}
