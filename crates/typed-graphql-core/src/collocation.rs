use std::cell::Cell;
use std::panic::Location;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

thread_local! {
    static TRUSTED: Cell<bool> = const { Cell::new(false) };
}

/// Run `body` with collocation enforcement suspended on the current thread.
///
/// Inside the closure, result accessors may be called from any file. The
/// prior trust state is restored when the closure returns (including by
/// panic), so nested uses compose.
pub fn allow_noncollocated_callers<T>(body: impl FnOnce() -> T) -> T {
    let _guard = TrustGuard::engage();
    body()
}

struct TrustGuard {
    prior: bool,
}
impl TrustGuard {
    fn engage() -> Self {
        let prior = TRUSTED.with(|trusted| trusted.replace(true));
        TrustGuard { prior }
    }
}
impl Drop for TrustGuard {
    fn drop(&mut self) {
        let prior = self.prior;
        TRUSTED.with(|trusted| trusted.set(prior));
    }
}

pub(crate) fn is_trusted() -> bool {
    TRUSTED.with(Cell::get)
}

/// Check that `caller` sits in the file that declared the definition whose
/// result is being read. A thread inside
/// [`allow_noncollocated_callers`] passes unconditionally.
pub(crate) fn verify(
    declaring_file: &Path,
    caller: &'static Location<'static>,
) -> Result<(), CollocationError> {
    if is_trusted() {
        return Ok(());
    }
    if Path::new(caller.file()) == declaring_file {
        return Ok(());
    }
    Err(CollocationError::NoncollocatedCaller {
        caller_file: caller.file().to_string(),
        caller_line: caller.line(),
        declaring_file: declaring_file.to_path_buf(),
    })
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CollocationError {
    #[error(
        "Result of a definition declared in `{}` was accessed from \
        `{caller_file}:{caller_line}`. Query results may only be read from \
        the file that declared the query; wrap the access in \
        `allow_noncollocated_callers` to override.",
        declaring_file.display(),
    )]
    NoncollocatedCaller {
        caller_file: String,
        caller_line: u32,
        declaring_file: PathBuf,
    },
}
