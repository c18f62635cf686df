// src/db/collection.rs

use std::{marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{common::error::AppError, db::store::SharedStore};

/// Versão atual do envelope gravado em cada coleção.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    items: &'a [T],
}

#[derive(Deserialize)]
struct EnvelopeHeader {
    version: u32,
    items: Value,
}

/// O que está gravado numa chave, sem interpretar versões antigas.
#[derive(Debug)]
pub enum Snapshot<T> {
    Empty,
    // Array JSON "cru", sem envelope: o formato antigo do localStorage.
    Legacy(Vec<Value>),
    Current(Vec<T>),
}

/// Uma coleção inteira serializada sob uma única chave.
///
/// Toda escrita é ler-tudo / alterar / gravar-tudo. O `Mutex` serializa essas
/// escritas dentro do processo; entre processos diferentes vale a última escrita.
pub struct Collection<T> {
    store: SharedStore,
    key: &'static str,
    write_lock: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key,
            write_lock: self.write_lock.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub fn new(store: SharedStore, key: &'static str) -> Self {
        Self {
            store,
            key,
            write_lock: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        }
    }

    pub async fn snapshot(&self) -> Result<Snapshot<T>, AppError> {
        let Some(bytes) = self.store.get(self.key).await? else {
            return Ok(Snapshot::Empty);
        };

        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Array(items) => Ok(Snapshot::Legacy(items)),
            other => {
                let header: EnvelopeHeader = serde_json::from_value(other)?;
                if header.version != SCHEMA_VERSION {
                    return Err(AppError::UnsupportedSchema {
                        key: self.key.to_string(),
                        found: header.version,
                    });
                }
                Ok(Snapshot::Current(serde_json::from_value(header.items)?))
            }
        }
    }

    /// Lê a coleção no formato atual. Dados legados precisam passar pela migração antes.
    pub async fn load(&self) -> Result<Vec<T>, AppError> {
        match self.snapshot().await? {
            Snapshot::Empty => Ok(Vec::new()),
            Snapshot::Current(items) => Ok(items),
            Snapshot::Legacy(_) => Err(AppError::UnsupportedSchema {
                key: self.key.to_string(),
                found: 0,
            }),
        }
    }

    async fn write(&self, items: &[T]) -> Result<(), AppError> {
        let bytes = serde_json::to_vec(&EnvelopeRef {
            version: SCHEMA_VERSION,
            items,
        })?;
        self.store.put(self.key, bytes).await
    }

    pub async fn replace(&self, items: &[T]) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.write(items).await
    }

    /// Ler-alterar-gravar. Se `f` falhar nada é gravado.
    pub async fn mutate<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let out = f(&mut items)?;
        self.write(&items).await?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_store::MemoryStore;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
    }

    fn collection() -> (SharedStore, Collection<Item>) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let col = Collection::new(store.clone(), "items");
        (store, col)
    }

    #[tokio::test]
    async fn writes_versioned_envelope() {
        let (store, col) = collection();
        col.mutate(|items| {
            items.push(Item { id: 1 });
            Ok(())
        })
        .await
        .unwrap();

        let raw: Value = serde_json::from_slice(&store.get("items").await.unwrap().unwrap()).unwrap();
        assert_eq!(raw["version"], SCHEMA_VERSION);
        assert_eq!(raw["items"][0]["id"], 1);
        assert_eq!(col.load().await.unwrap(), vec![Item { id: 1 }]);
    }

    #[tokio::test]
    async fn failed_mutation_writes_nothing() {
        let (_, col) = collection();
        col.replace(&[Item { id: 1 }]).await.unwrap();

        let result: Result<(), _> = col
            .mutate(|items| {
                items.clear();
                Err(AppError::ClientNotFound)
            })
            .await;

        assert!(matches!(result, Err(AppError::ClientNotFound)));
        assert_eq!(col.load().await.unwrap(), vec![Item { id: 1 }]);
    }

    #[tokio::test]
    async fn detects_legacy_and_future_layouts() {
        let (store, col) = collection();
        store.put("items", br#"[{"id": 7}]"#.to_vec()).await.unwrap();
        assert!(matches!(col.snapshot().await.unwrap(), Snapshot::Legacy(v) if v.len() == 1));
        assert!(matches!(col.load().await, Err(AppError::UnsupportedSchema { found: 0, .. })));

        store
            .put("items", br#"{"version": 99, "items": []}"#.to_vec())
            .await
            .unwrap();
        assert!(matches!(col.load().await, Err(AppError::UnsupportedSchema { found: 99, .. })));
    }

    #[tokio::test]
    async fn concurrent_mutations_are_not_lost() {
        let (_, col) = collection();
        let mut tasks = Vec::new();
        for id in 0..20 {
            let col = col.clone();
            tasks.push(tokio::spawn(async move {
                col.mutate(|items| {
                    items.push(Item { id });
                    Ok(())
                })
                .await
            }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }
        assert_eq!(col.load().await.unwrap().len(), 20);
    }
}
