// Natural (numeric-aware) ordering for file, state, and display names
// "state-2" sorts before "state-10", case differences don't split runs

use std::cmp::Ordering;

/// Compare two names the way a directory listing should read: digit runs
/// compare by numeric value, everything else compares case-insensitively.
/// Falls back to a case-sensitive comparison so equal-looking names still
/// have a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let run_a = take_digits(&mut ca);
                    let run_b = take_digits(&mut cb);
                    match cmp_digit_runs(&run_a, &run_b) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    let fx = x.to_lowercase().next().unwrap_or(x);
                    let fy = y.to_lowercase().next().unwrap_or(y);
                    match fx.cmp(&fy) {
                        Ordering::Equal => {
                            ca.next();
                            cb.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }

    // Case-insensitively equal: break the tie on the raw strings
    a.cmp(b)
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek() {
        if c.is_ascii_digit() {
            run.push(*c);
            chars.next();
        } else {
            break;
        }
    }
    run
}

/// Compare digit runs by value without parsing: strip leading zeros, then a
/// longer run is larger, equal lengths compare lexically. Avoids overflow on
/// arbitrarily long runs.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
