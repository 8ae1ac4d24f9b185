use crate::error::QuillError;

pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: i64,
    size: i64,
}

impl Page {
    pub fn new(number: i64, size: i64) -> Result<Self, QuillError> {
        if number < 1 {
            return Err(QuillError::InvalidArgument(
                "page number should be greater than 0".into(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(QuillError::InvalidArgument(format!(
                "page size should be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { number, size })
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    /// Pages needed to hold `total_rows` at this page size.
    pub fn total_pages(&self, total_rows: i64) -> i64 {
        (total_rows.max(0) + self.size - 1) / self.size
    }

    /// Reject pages past the end. Page 1 of an empty table is allowed and
    /// yields an empty listing.
    pub fn check_bounds(&self, total_pages: i64) -> Result<(), QuillError> {
        if self.number > total_pages.max(1) {
            return Err(QuillError::InvalidArgument(format!(
                "requested page {} does not exist; total pages is {total_pages}",
                self.number
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_arguments() {
        assert!(matches!(Page::new(0, 10), Err(QuillError::InvalidArgument(_))));
        assert!(matches!(Page::new(-3, 10), Err(QuillError::InvalidArgument(_))));
        assert!(matches!(Page::new(1, 0), Err(QuillError::InvalidArgument(_))));
        assert!(matches!(
            Page::new(1, MAX_PAGE_SIZE + 1),
            Err(QuillError::InvalidArgument(_))
        ));
    }

    #[test]
    fn offset_and_total_pages() {
        let page = Page::new(3, 10).unwrap();
        assert_eq!(page.offset(), 20);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(1), 1);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(21), 3);
    }

    #[test]
    fn bounds_use_requested_size() {
        let page = Page::new(3, 10).unwrap();
        assert!(page.check_bounds(page.total_pages(21)).is_ok());
        assert!(matches!(
            page.check_bounds(page.total_pages(20)),
            Err(QuillError::InvalidArgument(_))
        ));
    }

    #[test]
    fn first_page_of_empty_table_is_allowed() {
        let first = Page::new(1, 5).unwrap();
        assert!(first.check_bounds(first.total_pages(0)).is_ok());
        let second = Page::new(2, 5).unwrap();
        assert!(second.check_bounds(second.total_pages(0)).is_err());
    }
}
