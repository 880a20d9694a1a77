use assert_cmd::Command;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env_remove("RUST_LOG").args(["--log-level", "error"]);
    cmd
}

#[test]
fn solves_an_equation() {
    cmd()
        .arg("2x+1=5")
        .assert()
        .success()
        .stdout("Solution: {x: 2}\n");
}

#[test]
fn evaluates_each_argument_in_order() {
    cmd()
        .args(["2+2", "x^2=4"])
        .assert()
        .success()
        .stdout("Result: 4\nSolution: [{x: -2}, {x: 2}]\n");
}

#[test]
fn stops_at_the_first_failure() {
    cmd()
        .args(["2+2", "x=1=2", "3+3"])
        .assert()
        .failure()
        .stdout("Result: 4\n")
        .stderr("syntax error: expected one `=`, found 2\n");
}

#[test]
fn reports_division_by_zero() {
    cmd()
        .arg("1/0")
        .assert()
        .failure()
        .stderr("cannot evaluate: division by zero\n");
}

#[test]
fn reads_lines_from_stdin() {
    cmd()
        .write_stdin("2+2\n\n23x - 8y = 99\n")
        .assert()
        .success()
        .stdout("Result: 4\nSolution: {x: 8/23*y+99/23}\n");
}
