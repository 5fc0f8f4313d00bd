use super::prelude::*;
use crate::history::{self, History, MAX_HISTORY};
use crate::shell::Shell;

#[test]
fn push_evicts_the_oldest_past_capacity() {
    let mut history = History::new();
    for i in 1..=12 {
        history.push(&format!("cmd{i}"));
    }
    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history.nth_oldest(1), Some("cmd3"));
    assert_eq!(history.nth_oldest(MAX_HISTORY), Some("cmd12"));
}

#[test]
fn nth_oldest_is_one_based_and_bounded() {
    let mut history = History::new();
    history.push("first");
    history.push("second");
    assert_eq!(history.nth_oldest(0), None);
    assert_eq!(history.nth_oldest(1), Some("first"));
    assert_eq!(history.nth_oldest(2), Some("second"));
    assert_eq!(history.nth_oldest(3), None);
}

#[test]
fn display_order_is_newest_first() {
    let mut history = History::new();
    history.push("a");
    history.push("b");
    history.push("c");
    let shown: Vec<&str> = history.iter_newest_first().collect();
    assert_eq!(shown, ["c", "b", "a"]);
}

#[test]
#[serial]
fn file_mirror_round_trips() {
    test_init();
    let home = "home/hist-roundtrip";
    std::fs::create_dir_all(home).unwrap();
    let _ = std::fs::remove_file(format!("{home}/.tsh_history"));

    history::append_to_file(home, "ls");
    history::append_to_file(home, "sleep 5 &");
    history::append_to_file(home, "jobs");

    let loaded = history::load(home);
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.nth_oldest(1), Some("ls"));
    assert_eq!(loaded.nth_oldest(3), Some("jobs"));
}

#[test]
#[serial]
fn load_keeps_only_the_most_recent_entries() {
    test_init();
    let home = "home/hist-trunc";
    std::fs::create_dir_all(home).unwrap();
    let _ = std::fs::remove_file(format!("{home}/.tsh_history"));
    for i in 1..=15 {
        history::append_to_file(home, &format!("cmd{i}"));
    }

    let loaded = history::load(home);
    assert_eq!(loaded.len(), MAX_HISTORY);
    assert_eq!(loaded.nth_oldest(1), Some("cmd6"));
    assert_eq!(loaded.nth_oldest(MAX_HISTORY), Some("cmd15"));
}

#[test]
#[serial]
fn load_of_a_missing_file_yields_an_empty_log() {
    test_init();
    let home = "home/hist-missing";
    std::fs::create_dir_all(home).unwrap();
    let _ = std::fs::remove_file(format!("{home}/.tsh_history"));

    let loaded = history::load(home);
    assert!(loaded.is_empty());
}

#[test]
#[serial]
fn recall_reexecutes_the_nth_oldest_entry() {
    test_init();
    crate::jobs::with_jobs(|jobs| jobs.clear());
    std::fs::write("etc/passwd", "root:root:home/root\n").unwrap();
    let _ = std::fs::remove_dir_all("home/zoe");

    let mut shell = Shell::new(History::new(), true);
    shell.history.push("adduser zoe pw");

    crate::eval::eval_line(&mut shell, "!1\n");

    // The `!1` line is appended before resolution, and the recalled line is
    // fed back through the evaluator, so it both runs and re-appends.
    assert!(crate::auth::user_exists("zoe"));
    assert_eq!(shell.history.nth_oldest(1), Some("adduser zoe pw"));
    assert_eq!(shell.history.nth_oldest(2), Some("!1"));
    assert_eq!(shell.history.nth_oldest(3), Some("adduser zoe pw"));
    assert_eq!(shell.history.len(), 3);
}

#[test]
#[serial]
fn recall_indexes_from_the_oldest_entry() {
    test_init();
    crate::jobs::with_jobs(|jobs| jobs.clear());

    let mut shell = Shell::new(History::new(), true);
    shell.history.push("adduser one pw");
    shell.history.push("jobs");

    // jobs is entry 2 counting oldest = 1, even though the display numbers it 1.
    crate::eval::eval_line(&mut shell, "!2\n");

    assert_eq!(shell.history.nth_oldest(3), Some("!2"));
    assert_eq!(shell.history.nth_oldest(4), Some("jobs"));
    crate::jobs::with_jobs(|jobs| assert!(!jobs.any_active()));
}

#[test]
#[serial]
fn out_of_range_recall_reports_and_runs_nothing() {
    test_init();
    crate::jobs::with_jobs(|jobs| jobs.clear());

    let mut shell = Shell::new(History::new(), true);
    shell.history.push("jobs");

    crate::eval::eval_line(&mut shell, "!5\n");
    // Only the failed `!5` line itself entered the log.
    assert_eq!(shell.history.len(), 2);
    assert_eq!(shell.history.nth_oldest(2), Some("!5"));

    crate::eval::eval_line(&mut shell, "!0\n");
    assert_eq!(shell.history.len(), 3);
    assert_eq!(shell.history.nth_oldest(3), Some("!0"));

    crate::jobs::with_jobs(|jobs| assert!(!jobs.any_active()));
}
