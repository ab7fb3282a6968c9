use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PlanError;

/// Workout plan as delivered by the plan listing / generation screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub plan_name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// One exercise entry of a plan, exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<SetCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Set count as found in plan documents: `3`, `3.0` or `"3 sets"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetCount {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SetCount {
    /// Positive set count, falling back to 1 for anything unusable
    pub fn normalize(&self) -> u32 {
        match self {
            SetCount::Integer(n) => {
                u32::try_from(*n).map_or(if *n > 0 { u32::MAX } else { 1 }, |n| n.max(1))
            }
            SetCount::Float(f) if f.is_finite() && *f >= 1.0 => {
                if *f >= u32::MAX as f64 {
                    u32::MAX
                } else {
                    f.trunc() as u32
                }
            }
            SetCount::Float(_) => 1,
            SetCount::Text(raw) => parse_set_count(raw),
        }
    }
}

impl From<u32> for SetCount {
    fn from(n: u32) -> Self {
        SetCount::Integer(i64::from(n))
    }
}

impl From<&str> for SetCount {
    fn from(s: &str) -> Self {
        SetCount::Text(s.to_string())
    }
}

/// Parse a textual set count with integer-prefix semantics.
///
/// Leading whitespace and a sign are accepted, trailing text is ignored
/// (`"4 sets"` is 4). Empty, non-numeric, zero and negative inputs yield 1.
/// Values too large for `u32` saturate.
pub fn parse_set_count(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];

    if negative || digits.is_empty() {
        return 1;
    }

    match digits.parse::<u32>() {
        Ok(n) => n.max(1),
        // only digits remain, so the sole failure mode is overflow
        Err(_) => u32::MAX,
    }
}

/// Duration as found in plan documents: any number, or numeric text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeconds {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawSeconds {
    /// Whole seconds; negative, non-finite or unparseable values become 0
    /// and fractions are truncated. A present value always stays present.
    fn to_seconds(&self) -> u32 {
        match self {
            RawSeconds::Integer(n) => {
                u32::try_from(*n).unwrap_or(if *n > 0 { u32::MAX } else { 0 })
            }
            RawSeconds::Float(f) => float_seconds(*f),
            RawSeconds::Text(raw) => raw.trim().parse::<f64>().map_or(0, float_seconds),
        }
    }
}

fn float_seconds(f: f64) -> u32 {
    if !f.is_finite() || f <= 0.0 {
        0
    } else if f >= u32::MAX as f64 {
        u32::MAX
    } else {
        f.trunc() as u32
    }
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawSeconds>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(RawSeconds::to_seconds))
}

/// How an exercise progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ExerciseKind {
    /// Counts down and advances on its own
    Timed { duration_seconds: u32 },
    /// Waits for the user to finish the set
    Reps,
}

/// Rendering hints passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseMedia {
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Normalized exercise as consumed by the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanExercise {
    pub name: String,
    pub total_sets: u32,
    pub reps: Option<String>,
    pub kind: ExerciseKind,
    pub media: ExerciseMedia,
}

impl PlanExercise {
    pub fn is_timed(&self) -> bool {
        matches!(self.kind, ExerciseKind::Timed { .. })
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        match self.kind {
            ExerciseKind::Timed { duration_seconds } => Some(duration_seconds),
            ExerciseKind::Reps => None,
        }
    }

    fn from_exercise(exercise: &Exercise) -> Self {
        let kind = match exercise.duration_seconds {
            Some(duration_seconds) => ExerciseKind::Timed { duration_seconds },
            None => ExerciseKind::Reps,
        };

        Self {
            name: exercise.name.trim().to_string(),
            total_sets: exercise.sets.as_ref().map_or(1, SetCount::normalize),
            reps: exercise.reps.clone(),
            kind,
            media: ExerciseMedia {
                video_url: exercise.video_url.clone(),
                image_url: exercise.image_url.clone(),
                description: exercise.description.clone(),
            },
        }
    }
}

/// Validated, read-only view of a plan for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    id: Option<String>,
    name: String,
    exercises: Vec<PlanExercise>,
}

impl SessionPlan {
    /// Validate and normalize a supplied plan
    pub fn from_plan(plan: &WorkoutPlan) -> Result<Self, PlanError> {
        if plan.exercises.is_empty() {
            return Err(PlanError::NoExercises {
                plan: plan.plan_name.clone(),
            });
        }

        if let Some(position) = plan
            .exercises
            .iter()
            .position(|e| e.name.trim().is_empty())
        {
            return Err(PlanError::UnnamedExercise {
                plan: plan.plan_name.clone(),
                position: position + 1,
            });
        }

        let exercises: Vec<PlanExercise> = plan
            .exercises
            .iter()
            .map(PlanExercise::from_exercise)
            .collect();

        tracing::debug!(
            "Adapted plan '{}' with {} exercises",
            plan.plan_name,
            exercises.len()
        );

        Ok(Self {
            id: plan.id.clone(),
            name: plan.plan_name.clone(),
            exercises,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exercises(&self) -> &[PlanExercise] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Always false for a validated plan; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlanExercise> {
        self.exercises.get(index)
    }

    /// Exercise at `index`, clamped to the last one.
    pub fn exercise(&self, index: usize) -> &PlanExercise {
        let last = self.exercises.len() - 1;
        &self.exercises[index.min(last)]
    }

    pub fn has_next(&self, index: usize) -> bool {
        index + 1 < self.exercises.len()
    }
}

impl WorkoutPlan {
    /// Parse a plan from the JSON shape produced by the plan API
    pub fn from_json_str(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate this plan into a session view
    pub fn adapt(&self) -> Result<SessionPlan, PlanError> {
        SessionPlan::from_plan(self)
    }
}
