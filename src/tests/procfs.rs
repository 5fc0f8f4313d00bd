use super::prelude::*;
use crate::jobs::{JobState, JobTable};
use crate::procfs::{delete_record, write_job_record, write_record};

#[test]
#[serial]
fn record_has_the_full_status_layout() {
    test_init();
    assert!(write_record(4242, b"sleep", b'R', b"alice"));

    let contents = std::fs::read_to_string("proc/4242").unwrap();
    let shell_pid = crate::common::getpid();
    let sid = unsafe { libc::getsid(0) };
    let expected = format!(
        "Name:\tsleep\nPid:\t4242\nPPid:\t{shell_pid}\nPGid:\t4242\nSid:\t{sid}\nState:\tR\nOwner:\talice\n"
    );
    assert_eq!(contents, expected);

    assert!(delete_record(4242));
    assert!(!std::path::Path::new("proc/4242").exists());
}

#[test]
#[serial]
fn rewrite_replaces_the_record_in_place() {
    test_init();
    assert!(write_record(4243, b"sleep", b'R', b"root"));
    assert!(write_record(4243, b"sleep", b'T', b"root"));

    let contents = std::fs::read_to_string("proc/4243").unwrap();
    assert!(contents.contains("State:\tT\n"));
    assert_eq!(contents.matches("Name:").count(), 1);
    assert!(delete_record(4243));
}

#[test]
#[serial]
fn job_record_uses_the_command_word_and_state_code() {
    test_init();
    let mut table = JobTable::new();
    table.insert(4244, JobState::Stopped, "sleep 100 &");
    let job = table.find_by_pid(4244).unwrap();
    assert!(write_job_record(job, b"root"));

    let contents = std::fs::read_to_string("proc/4244").unwrap();
    assert!(contents.starts_with("Name:\tsleep\n"));
    assert!(contents.contains("State:\tT\n"));
    assert!(contents.ends_with("Owner:\troot\n"));
    assert!(delete_record(4244));
}

#[test]
#[serial]
fn deleting_an_absent_record_counts_as_deleted() {
    test_init();
    let _ = std::fs::remove_file("proc/999999");
    assert!(delete_record(999999));
}
