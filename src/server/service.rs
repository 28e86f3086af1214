use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::types::curd::{CurdRequest, CurdResponse};
use crate::types::page::{PageRequest, PageResponse};

use super::db::{CurdRecord, Database};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("curd {0} not found")]
    NotFound(u64),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("database error: {0:#}")]
    Database(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// CRUD over the `curd` table. Each operation runs in one transaction.
pub struct CurdService {
    db: Arc<Database>,
}

impl CurdService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create(&self, req: CurdRequest) -> ServiceResult<CurdResponse> {
        req.validate()?;
        let record = self.db.with_transaction(|tx| {
            tx.create_curd(CurdRecord {
                name: req.name,
                email: req.email,
                phone: req.phone,
                city: req.city,
                ..Default::default()
            })
        })?;
        info!("Created curd {} '{}'", record.id, record.name);
        Ok(record.into())
    }

    pub fn get(&self, id: u64) -> ServiceResult<CurdResponse> {
        let record = self.db.with_transaction(|tx| {
            if !tx.is_curd_exists(id)? {
                return Ok(None);
            }
            tx.get_curd(id).map(Some)
        })?;
        match record {
            Some(record) => Ok(record.into()),
            None => Err(ServiceError::NotFound(id)),
        }
    }

    pub fn list(&self, page: &PageRequest) -> ServiceResult<PageResponse<CurdResponse>> {
        let query = page
            .resolve()
            .map_err(|e| ServiceError::BadRequest(e.to_string()))?;
        debug!(
            "List curds page {} size {} order by {}",
            query.page, query.size, query.sort
        );

        let (records, total) = self.db.with_transaction(|tx| {
            let records = tx.list_curds(&query)?;
            let total = tx.count_curds()?;
            Ok((records, total))
        })?;

        Ok(PageResponse {
            items: records.into_iter().map(CurdResponse::from).collect(),
            total,
            page: query.page,
            size: query.size,
        })
    }

    pub fn update(&self, id: u64, req: CurdRequest) -> ServiceResult<CurdResponse> {
        req.validate()?;
        let record = self.db.with_transaction(|tx| {
            if !tx.is_curd_exists(id)? {
                return Ok(None);
            }
            let record = CurdRecord {
                id,
                name: req.name,
                email: req.email,
                phone: req.phone,
                city: req.city,
                ..Default::default()
            };
            tx.update_curd(&record).map(Some)
        })?;
        match record {
            Some(record) => {
                info!("Updated curd {id}");
                Ok(record.into())
            }
            None => Err(ServiceError::NotFound(id)),
        }
    }

    pub fn delete(&self, id: u64) -> ServiceResult<()> {
        let deleted = self.db.with_transaction(|tx| {
            if !tx.is_curd_exists(id)? {
                return Ok(false);
            }
            tx.delete_curd(id)?;
            Ok(true)
        })?;
        if !deleted {
            return Err(ServiceError::NotFound(id));
        }
        info!("Deleted curd {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::server::db::config::DbConfig;
    use crate::server::db::factory::DbFactory;
    use crate::config::CommonConfig;

    use super::*;

    fn service() -> CurdService {
        let mut cfg = DbConfig::default();
        cfg.sqlite.memory = true;
        let db = DbFactory::new().build_db(&cfg).unwrap();
        CurdService::new(db)
    }

    fn request(name: &str) -> CurdRequest {
        CurdRequest {
            name: name.to_string(),
            email: String::from("x@example.com"),
            phone: String::new(),
            city: String::from("Hue"),
        }
    }

    #[test]
    fn test_crud() {
        let svc = service();

        let created = svc.create(request("Alice")).unwrap();
        assert_eq!(created.name, "Alice");
        assert_eq!(svc.get(created.id).unwrap(), created);

        let updated = svc.update(created.id, request("Alicia")).unwrap();
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.created_at, created.created_at);

        let page = svc.list(&PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items, vec![updated]);

        svc.delete(created.id).unwrap();
        assert!(matches!(svc.get(created.id), Err(ServiceError::NotFound(id)) if id == created.id));
        assert!(matches!(svc.delete(created.id), Err(ServiceError::NotFound(_))));
        assert!(matches!(
            svc.update(created.id, request("Ghost")),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_validation() {
        let svc = service();
        assert!(matches!(svc.create(request("")), Err(ServiceError::Validation(_))));
        assert!(matches!(
            svc.create(request(&"n".repeat(101))),
            Err(ServiceError::Validation(_))
        ));

        let created = svc.create(request("Bob")).unwrap();
        assert!(matches!(
            svc.update(created.id, request("")),
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(svc.get(created.id).unwrap().name, "Bob");
    }

    #[test]
    fn test_bad_sort() {
        let svc = service();
        let page = PageRequest {
            sort: Some(String::from("password")),
            ..Default::default()
        };
        assert!(matches!(svc.list(&page), Err(ServiceError::BadRequest(_))));
    }
}
