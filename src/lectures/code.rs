use crate::error::Result;
use crate::storage::database::Database;
use crate::storage::PrivateCode;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Draw a code uniformly from `[A-Za-z0-9]{6}`.
pub fn draw_code<R: Rng + ?Sized>(rng: &mut R) -> PrivateCode {
    let raw: String = rng
        .sample_iter(&Alphanumeric)
        .take(PrivateCode::LEN)
        .map(char::from)
        .collect();

    PrivateCode::new_unchecked(raw)
}

/// Draw codes until one is not held by any stored lecture.
///
/// The check is not atomic with the caller's later write; the store's unique
/// index is what finally rejects a code that was taken in between.
pub fn allocate<R: Rng + ?Sized>(db: &Database, rng: &mut R) -> Result<PrivateCode> {
    let mut attempts = 0u32;
    loop {
        let code = draw_code(rng);
        attempts += 1;
        if !db.code_exists(&code)? {
            if attempts > 1 {
                tracing::debug!("allocated private code after {} draws", attempts);
            }
            return Ok(code);
        }
        tracing::debug!("private code collision, redrawing");
    }
}
