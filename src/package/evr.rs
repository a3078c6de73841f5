//! RPM version comparison.
//!
//! Follows rpm's `rpmvercmp`: versions are split into alternating numeric and
//! alphabetic segments, separators are ignored, numeric segments beat alphabetic
//! ones and a `~` sorts before everything, even the end of the string.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::Nevra;

/// Compare two version (or release) strings the way rpm does.
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    loop {
        while i < a.len() && !a[i].is_ascii_alphanumeric() && a[i] != b'~' {
            i += 1;
        }
        while j < b.len() && !b[j].is_ascii_alphanumeric() && b[j] != b'~' {
            j += 1;
        }

        let a_tilde = a.get(i) == Some(&b'~');
        let b_tilde = b.get(j) == Some(&b'~');
        if a_tilde || b_tilde {
            if !a_tilde {
                return Ordering::Greater;
            }
            if !b_tilde {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        if i >= a.len() || j >= b.len() {
            break;
        }

        let numeric = a[i].is_ascii_digit();
        let seg_a = segment(a, i, numeric);
        let seg_b = segment(b, j, numeric);
        i += seg_a.len();
        j += seg_b.len();

        // Segment types differ: numbers are newer than letters
        if seg_b.is_empty() {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ord = if numeric {
            let sa = trim_zeros(seg_a);
            let sb = trim_zeros(seg_b);
            sa.len().cmp(&sb.len()).then_with(|| sa.cmp(sb))
        } else {
            seg_a.cmp(seg_b)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    match (i >= a.len(), j >= b.len()) {
        (true, true) => Ordering::Equal,
        (false, _) => Ordering::Greater,
        (true, false) => Ordering::Less,
    }
}

fn segment(s: &[u8], start: usize, numeric: bool) -> &[u8] {
    let len = s[start..]
        .iter()
        .take_while(|c| {
            if numeric {
                c.is_ascii_digit()
            } else {
                c.is_ascii_alphabetic()
            }
        })
        .count();
    &s[start..start + len]
}

fn trim_zeros(s: &[u8]) -> &[u8] {
    let zeros = s.iter().take_while(|&&c| c == b'0').count();
    &s[zeros..]
}

/// Compare epoch, then version, then release. A missing epoch counts as 0.
pub fn compare_evr(a: &Nevra, b: &Nevra) -> Ordering {
    let epoch = |n: &Nevra| n.epoch.parse::<u64>().unwrap_or(0);
    epoch(a)
        .cmp(&epoch(b))
        .then_with(|| rpmvercmp(&a.version, &b.version))
        .then_with(|| rpmvercmp(&a.release, &b.release))
}

/// Keep only the newest entry per `name.arch`, in order of first appearance.
pub fn keep_newest(packages: Vec<Nevra>) -> Vec<Nevra> {
    let mut newest: Vec<Nevra> = Vec::with_capacity(packages.len());
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for pkg in packages {
        let key = (pkg.name.clone(), pkg.arch.clone());
        match index.get(&key) {
            Some(&pos) => {
                if compare_evr(&pkg, &newest[pos]) == Ordering::Greater {
                    newest[pos] = pkg;
                }
            }
            None => {
                index.insert(key, newest.len());
                newest.push(pkg);
            }
        }
    }

    newest
}
