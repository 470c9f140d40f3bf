//! [`Storage`] of the durable key-value slots.

pub mod file;
pub mod memory;

use derive_more::{AsRef, Display, Error as StdError, From};
use tracerr::Traced;

pub use self::{file::File, memory::Memory};

/// Storage operation.
pub use common::Handler as Storage;

/// Key of a [`Storage`] slot.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str)]
#[from(&str, String)]
pub struct Key(String);

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O operation failed.
    #[display("I/O operation failed: {_0}")]
    Io(std::io::Error),

    /// Stored slots cannot be (de)serialized.
    #[display("Malformed storage contents: {_0}")]
    Json(serde_json::Error),
}

/// [`Storage`] chosen at runtime.
#[derive(Clone, Debug, From)]
pub enum Backend {
    /// [`Memory`] storage.
    Memory(Memory),

    /// [`File`] storage.
    File(File),
}

impl<Op> Storage<Op> for Backend
where
    Memory: Storage<Op, Err = Traced<Error>>,
    File: Storage<Op, Ok = <Memory as Storage<Op>>::Ok, Err = Traced<Error>>,
{
    type Ok = <Memory as Storage<Op>>::Ok;
    type Err = Traced<Error>;

    async fn execute(&self, op: Op) -> Result<Self::Ok, Self::Err> {
        match self {
            Self::Memory(m) => m.execute(op).await,
            Self::File(f) => f.execute(op).await,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Insert, Select};

    use super::{Backend, Key, Memory, Storage as _};

    #[tokio::test]
    async fn backend_delegates_to_memory() {
        let memory = Memory::new();
        let backend = Backend::from(memory.clone());

        backend
            .execute(Insert((Key::from("user"), "{}".to_owned())))
            .await
            .unwrap();
        assert_eq!(
            memory
                .execute(Select(By::<Option<String>, _>::new(Key::from("user"))))
                .await
                .unwrap()
                .as_deref(),
            Some("{}"),
        );

        backend.execute(Delete(Key::from("user"))).await.unwrap();
        let slot = backend
            .execute(Select(By::<Option<String>, _>::new(Key::from("user"))))
            .await
            .unwrap();
        assert_eq!(slot, None);
    }
}
