//! The focus timer: a countdown state machine bound to at most one task at a
//! time. Ticking is pull-driven: the owner of the event loop calls `tick()`
//! once per wall-clock second while the machine is running. Because an idle
//! machine ignores ticks, `stop`/`reset`/`set_preset` cancel synchronously;
//! there is no background handle that could fire into a freshly reset timer.
//!
//! Timer state is transient; it is never persisted across runs.

use taskmate_core::tasks::{Task, TaskId, TaskStatus};
use tracing::debug;

/// Message surfaced when a session runs to completion.
pub const SESSION_COMPLETE_MESSAGE: &str = "Focus Session Complete! Take a break.";

/// Default session length in minutes.
pub const DEFAULT_PRESET_MINUTES: u64 = 25;

/// Preset session lengths offered by the UI.
pub const PRESET_MINUTES: [u64; 3] = [15, 25, 45];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

/// Event raised when the countdown reaches zero. The focused task is a weak
/// back-link by id; the consumer decides what (if anything) to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub focused_task: Option<TaskId>,
    pub message: String,
}

/// Countdown state machine. Invariants at every observable point:
/// `0 <= time_left_secs <= initial_secs` and `initial_secs > 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTimer {
    phase: Phase,
    time_left: u64,
    initial: u64,
    focused_task: Option<TaskId>,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusTimer {
    pub fn new() -> Self {
        let initial = DEFAULT_PRESET_MINUTES * 60;
        Self {
            phase: Phase::Idle,
            time_left: initial,
            initial,
            focused_task: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn time_left_secs(&self) -> u64 {
        self.time_left
    }

    pub fn initial_secs(&self) -> u64 {
        self.initial
    }

    pub fn focused_task(&self) -> Option<&TaskId> {
        self.focused_task.as_ref()
    }

    /// Starts the countdown. No-op while already running. When nothing is
    /// focused yet, the first task that is not done is auto-selected; if no
    /// such task exists the session runs unfocused.
    pub fn start(&mut self, tasks: &[Task]) {
        if self.phase == Phase::Running {
            return;
        }
        if self.focused_task.is_none() {
            self.focused_task = tasks
                .iter()
                .find(|t| t.status != TaskStatus::Done)
                .map(|t| t.id.clone());
            if let Some(id) = &self.focused_task {
                debug!(%id, "auto-focused first active task");
            }
        }
        self.phase = Phase::Running;
    }

    /// Advances the countdown by one second. Ticks while idle are ignored,
    /// which is what makes cancellation race-free. When the countdown
    /// reaches zero the machine stops and returns the completion event.
    pub fn tick(&mut self) -> Option<Completion> {
        if self.phase != Phase::Running {
            return None;
        }
        if self.time_left > 0 {
            self.time_left -= 1;
        }
        if self.time_left == 0 {
            self.phase = Phase::Idle;
            return Some(Completion {
                focused_task: self.focused_task.clone(),
                message: SESSION_COMPLETE_MESSAGE.to_string(),
            });
        }
        None
    }

    /// Manual pause: no notification, no completion prompt.
    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Stops the countdown and restores the full configured duration.
    pub fn reset(&mut self) {
        self.stop();
        self.time_left = self.initial;
    }

    /// Stops the countdown and adopts a preset length.
    pub fn set_preset(&mut self, minutes: u64) {
        self.set_duration_secs(minutes * 60);
    }

    /// Stops the countdown and adopts a new duration for both the remaining
    /// and the initial time. A zero-length session makes no sense; it clamps
    /// to one second so `initial_secs > 0` always holds.
    pub fn set_duration_secs(&mut self, secs: u64) {
        self.stop();
        let secs = secs.max(1);
        self.initial = secs;
        self.time_left = secs;
    }

    /// Binds the session to a task. Legal in any phase and never touches the
    /// remaining time.
    pub fn focus_on(&mut self, id: TaskId) {
        self.focused_task = Some(id);
    }

    /// Detaches the focused task. Tolerated while running: the countdown
    /// simply continues unfocused.
    pub fn unfocus(&mut self) {
        self.focused_task = None;
    }

    /// Clears the focus if it points at `id`. Called when a task is deleted
    /// so the weak back-link never dangles.
    pub fn release_task(&mut self, id: &TaskId) {
        if self.focused_task.as_ref() == Some(id) {
            self.focused_task = None;
        }
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.time_left / 60, self.time_left % 60)
    }

    /// Elapsed fraction in `[0, 1]`, for the progress ring.
    pub fn progress(&self) -> f64 {
        (self.initial - self.time_left) as f64 / self.initial as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskmate_core::tasks::Priority;

    fn task(title: &str, status: TaskStatus) -> Task {
        Task {
            id: TaskId::from(title),
            title: title.into(),
            priority: Priority::default(),
            notes: None,
            due_date: None,
            status,
            subtasks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn assert_invariants(timer: &FocusTimer) {
        assert!(timer.initial_secs() > 0);
        assert!(timer.time_left_secs() <= timer.initial_secs());
    }

    #[test]
    fn starts_idle_with_the_default_session() {
        let timer = FocusTimer::new();
        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.time_left_secs(), DEFAULT_PRESET_MINUTES * 60);
        assert_eq!(timer.display(), "25:00");
        assert_invariants(&timer);
    }

    #[test]
    fn start_auto_focuses_the_first_active_task() {
        let tasks = vec![
            task("finished", TaskStatus::Done),
            task("next up", TaskStatus::Todo),
            task("later", TaskStatus::Todo),
        ];
        let mut timer = FocusTimer::new();
        timer.start(&tasks);

        assert!(timer.is_running());
        assert_eq!(timer.focused_task(), Some(&TaskId::from("next up")));
    }

    #[test]
    fn start_leaves_focus_alone_when_already_set() {
        let tasks = vec![task("first", TaskStatus::Todo)];
        let mut timer = FocusTimer::new();
        timer.focus_on(TaskId::from("chosen"));
        timer.start(&tasks);
        assert_eq!(timer.focused_task(), Some(&TaskId::from("chosen")));
    }

    #[test]
    fn start_with_only_done_tasks_runs_unfocused() {
        let tasks = vec![task("finished", TaskStatus::Done)];
        let mut timer = FocusTimer::new();
        timer.start(&tasks);
        assert!(timer.is_running());
        assert_eq!(timer.focused_task(), None);
    }

    #[test]
    fn two_second_session_completes_after_two_ticks() {
        let tasks = vec![task("x", TaskStatus::Todo)];
        let mut timer = FocusTimer::new();
        timer.set_duration_secs(2);
        timer.start(&tasks);

        assert_eq!(timer.tick(), None);
        assert_eq!(timer.time_left_secs(), 1);
        assert_invariants(&timer);

        let completion = timer.tick().expect("second tick completes");
        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(completion.focused_task, Some(TaskId::from("x")));
        assert_eq!(completion.message, SESSION_COMPLETE_MESSAGE);
    }

    #[test]
    fn ticks_while_idle_are_ignored() {
        let mut timer = FocusTimer::new();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.time_left_secs(), timer.initial_secs());
    }

    #[test]
    fn no_tick_lands_after_reset() {
        let mut timer = FocusTimer::new();
        timer.set_duration_secs(10);
        timer.start(&[]);
        timer.tick();
        timer.reset();

        // A tick scheduled before the reset arrives late; it must not touch
        // the restored countdown.
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.time_left_secs(), 10);
        assert_eq!(timer.phase(), Phase::Idle);
        assert_invariants(&timer);
    }

    #[test]
    fn stop_is_a_silent_pause() {
        let mut timer = FocusTimer::new();
        timer.start(&[]);
        timer.tick();
        let remaining = timer.time_left_secs();
        timer.stop();

        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.time_left_secs(), remaining);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let mut timer = FocusTimer::new();
        timer.start(&[]);
        timer.tick();
        let remaining = timer.time_left_secs();
        timer.start(&[]);
        assert_eq!(timer.time_left_secs(), remaining);
    }

    #[test]
    fn presets_stop_and_adopt_the_new_length() {
        let mut timer = FocusTimer::new();
        timer.start(&[]);
        timer.set_preset(15);

        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.time_left_secs(), 15 * 60);
        assert_eq!(timer.initial_secs(), 15 * 60);
        assert_invariants(&timer);
    }

    #[test]
    fn zero_duration_clamps_to_one_second() {
        let mut timer = FocusTimer::new();
        timer.set_duration_secs(0);
        assert_eq!(timer.initial_secs(), 1);
        assert_invariants(&timer);
    }

    #[test]
    fn unfocus_while_running_detaches_without_touching_time() {
        let mut timer = FocusTimer::new();
        timer.focus_on(TaskId::from("x"));
        timer.start(&[]);
        timer.tick();
        let remaining = timer.time_left_secs();

        timer.unfocus();
        assert!(timer.is_running());
        assert_eq!(timer.focused_task(), None);
        assert_eq!(timer.time_left_secs(), remaining);
    }

    #[test]
    fn release_task_only_clears_a_matching_focus() {
        let mut timer = FocusTimer::new();
        timer.focus_on(TaskId::from("kept"));
        timer.release_task(&TaskId::from("other"));
        assert_eq!(timer.focused_task(), Some(&TaskId::from("kept")));

        timer.release_task(&TaskId::from("kept"));
        assert_eq!(timer.focused_task(), None);
    }

    #[test]
    fn reset_restores_the_full_duration() {
        let mut timer = FocusTimer::new();
        timer.set_duration_secs(30);
        timer.start(&[]);
        timer.tick();
        timer.tick();
        timer.reset();

        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.time_left_secs(), timer.initial_secs());
    }

    #[test]
    fn display_and_progress_track_the_countdown() {
        let mut timer = FocusTimer::new();
        timer.set_duration_secs(90);
        assert_eq!(timer.display(), "01:30");
        assert!((timer.progress() - 0.0).abs() < f64::EPSILON);

        timer.start(&[]);
        for _ in 0..45 {
            timer.tick();
        }
        assert_eq!(timer.display(), "00:45");
        assert!((timer.progress() - 0.5).abs() < f64::EPSILON);
    }
}
