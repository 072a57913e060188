use rusqlite::Connection;

use crate::error::Result;
use crate::models::StoreStats;

pub struct StoreStatsQuery<'a> {
    conn: &'a Connection,
}

impl<'a> StoreStatsQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn count_where(&self, predicate: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM documents WHERE {predicate}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn get_stats(&self) -> Result<StoreStats> {
        let total = self.count_where("1 = 1")?;
        let with_doi = self.count_where("doi IS NOT NULL AND TRIM(doi) != ''")?;
        let with_abstract = self.count_where("abstract IS NOT NULL AND TRIM(abstract) != ''")?;
        let open_access = self.count_where("open_access = 1")?;
        let scored = self.count_where("relevance_score IS NOT NULL")?;
        let fetched = self.count_where("status = 'fetched'")?;

        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(NULLIF(LOWER(TRIM(source)), ''), 'unknown') AS tag, COUNT(*) AS n
             FROM documents
             GROUP BY tag
             ORDER BY n DESC, tag ASC",
        )?;
        let by_source = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(StoreStats {
            total,
            with_doi,
            with_abstract,
            open_access,
            scored,
            fetched,
            by_source,
        })
    }
}
