use crate::model::*;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::fmt;

fn serialize_id(id: u64) -> [u8; 8] {
    id.to_le_bytes()
}

#[derive(Debug)]
pub enum Error {
    Storage(sled::Error),
    Codec(bincode::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Storage(err) => write!(f, "storage error: {}", err),
            Error::Codec(err) => write!(f, "codec error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        Error::Storage(err)
    }
}

impl From<TransactionError<bincode::Error>> for Error {
    fn from(err: TransactionError<bincode::Error>) -> Self {
        match err {
            TransactionError::Storage(e) => Error::Storage(e),
            TransactionError::Abort(e) => Error::Codec(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait VisitDb {
    type Error;
    fn new_visitor(&self) -> std::result::Result<u64, Self::Error>;
    fn get_visit(&self, visitor: u64) -> std::result::Result<Visit, Self::Error>;
    /// Loads the visit (or a fresh one), applies `f` and stores the result
    /// atomically. `f` may run more than once on conflicts.
    fn update_visit<F, R>(&self, visitor: u64, f: F) -> std::result::Result<R, Self::Error>
    where
        F: Fn(&mut Visit) -> R;
}

pub const VISITS: &[u8] = b"visits";

impl VisitDb for sled::Db {
    type Error = Error;

    fn new_visitor(&self) -> Result<u64> {
        Ok(self.generate_id()?)
    }

    fn get_visit(&self, visitor: u64) -> Result<Visit> {
        let visits = self.open_tree(VISITS)?;
        match visits.get(serialize_id(visitor))? {
            Some(data) => bincode::deserialize(&data).map_err(Error::Codec),
            None => Ok(Visit::default()),
        }
    }

    fn update_visit<F, R>(&self, visitor: u64, f: F) -> Result<R>
    where
        F: Fn(&mut Visit) -> R,
    {
        let visits = self.open_tree(VISITS)?;
        let key = serialize_id(visitor);
        let result = visits.transaction(|visits| {
            let mut visit = match visits.get(key)? {
                Some(data) => {
                    bincode::deserialize(&data).map_err(ConflictableTransactionError::Abort)?
                }
                None => Visit::default(),
            };
            let result = f(&mut visit);
            let data = bincode::serialize(&visit).map_err(ConflictableTransactionError::Abort)?;
            visits.insert(&key[..], data)?;
            Ok(result)
        })?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temporary() -> sled::Db {
        sled::Config::new().temporary(true).open().unwrap()
    }

    #[test]
    fn unknown_visitor_starts_empty() {
        let db = temporary();
        let visitor = db.new_visitor().unwrap();
        assert_eq!(db.get_visit(visitor).unwrap(), Visit::default());
    }

    #[test]
    fn visitors_are_distinct() {
        let db = temporary();
        let a = db.new_visitor().unwrap();
        let b = db.new_visitor().unwrap();
        assert_ne!(a, b);
        db.update_visit(a, |visit| visit.selected = Some("pelicula3".to_owned()))
            .unwrap();
        assert_eq!(db.get_visit(a).unwrap().selected.as_deref(), Some("pelicula3"));
        assert_eq!(db.get_visit(b).unwrap().selected, None);
    }

    #[test]
    fn update_returns_closure_result() {
        let db = temporary();
        let visitor = db.new_visitor().unwrap();
        db.update_visit(visitor, |visit| visit.notice = Some("hola".to_owned()))
            .unwrap();
        let taken = db.update_visit(visitor, |visit| visit.notice.take()).unwrap();
        assert_eq!(taken.as_deref(), Some("hola"));
        assert_eq!(db.get_visit(visitor).unwrap().notice, None);
    }
}
