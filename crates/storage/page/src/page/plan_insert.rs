use crate::errors::insert_error::InsertError;
use crate::insertion_plan::{InsertionOffset, InsertionPlan, InsertionSlot};
use crate::page::api::Page;
use crate::slot::SLOT_SIZE;

impl Page {
    /// Plans the insertion of a row into the page.
    ///
    /// Determines the appropriate slot (either reusing an existing invalid
    /// one or allocating a new one) and calculates the offset for the new
    /// row, checking there is enough free space for both the row and, if
    /// needed, a new slot entry.
    pub(super) fn plan_insert_internal(
        &self,
        row_len: usize,
    ) -> Result<InsertionPlan, InsertError> {
        let slot = self.get_insertion_slot()?;

        let header = self.header_ref()?;
        let page_free_space = header.get_free_space()? as usize;

        let needs_new_slot = matches!(slot, InsertionSlot::New);
        let required_total = row_len + if needs_new_slot { SLOT_SIZE } else { 0 };

        if page_free_space < required_total {
            return Err(InsertError::NotEnoughSpace {
                row_len,
                page_free_space,
            });
        }

        let offset = self.find_insertion_offset(row_len, None)?;

        Ok(InsertionPlan { slot, offset })
    }

    /// Determines the slot to use for the insertion: the first invalid slot
    /// found, or a new one if every existing slot is in use.
    fn get_insertion_slot(&self) -> Result<InsertionSlot, InsertError> {
        let header = self.header_ref()?;
        let slot_array = self.slot_array_ref()?;
        let slot_count = header.get_slot_count()? as usize;

        for slot_index in 0..slot_count {
            let current_slot = slot_array.slot_ref(slot_index as u32)?;
            if !self.is_slot_valid(&current_slot)? {
                return Ok(InsertionSlot::Reuse(slot_index));
            }
        }

        Ok(InsertionSlot::New)
    }

    /// Computes the offset at which the new row can be inserted in the page.
    ///
    /// Checks the following conditions, in this order:
    /// 1) between `free_start` and `free_end`
    /// 2) in a gap between two existing rows
    /// 3) in the tail gap between the last (physically) row and `free_end`
    /// 4) after a compaction
    ///
    /// # Arguments
    ///
    /// * `row_len` - The length of the new row, in bytes.
    /// * `treat_slot_len_as_zero` - When inserting the grown replacement for
    ///   an existing row (update path), the slot index of the row being
    ///   replaced — its current space is treated as already free.
    pub(super) fn find_insertion_offset(
        &self,
        row_len: usize,
        treat_slot_len_as_zero: Option<usize>,
    ) -> Result<InsertionOffset, InsertError> {
        let header = self.header_ref()?;
        let slot_array = self.slot_array_ref()?;

        let free_start = header.get_free_start()? as usize;
        let free_end = header.get_free_end()? as usize;
        let slot_count = header.get_slot_count()? as usize;

        if free_end.saturating_sub(free_start) >= row_len {
            return Ok(InsertionOffset::Exact(free_start));
        }

        let mut extents: Vec<(usize, usize)> = Vec::new();

        for i in 0..slot_count {
            let s = slot_array.slot_ref(i as u32)?;
            if self.is_slot_valid(&s)? {
                let start = s.offset()? as usize;
                let end = if Some(i) == treat_slot_len_as_zero {
                    start
                } else {
                    start + s.length()? as usize
                };

                extents.push((start, end));
            }
        }

        if extents.is_empty() {
            return Ok(InsertionOffset::AfterCompactionFreeStart);
        }

        extents.sort_by_key(|(start, _end)| *start);

        for w in extents.windows(2) {
            let (_a_start, a_end) = w[0];
            let (b_start, _b_end) = w[1];

            if b_start >= a_end && (b_start - a_end) >= row_len {
                return Ok(InsertionOffset::Exact(a_end));
            }
        }

        let (_last_start, last_end) = *extents.last().unwrap();
        if free_end >= last_end && (free_end - last_end) >= row_len {
            return Ok(InsertionOffset::Exact(last_end));
        }

        Ok(InsertionOffset::AfterCompactionFreeStart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_id::PageId;
    use crate::page_type::PageType;
    use crate::slot::SLOT_SIZE;
    use crate::{HEADER_SIZE, PAGE_SIZE};

    #[test]
    fn get_insertion_slot_no_slots_returns_new() {
        let page = Page::new_empty(PageId::new(1, 0), PageType::Keys).unwrap();
        assert!(matches!(
            page.get_insertion_slot().unwrap(),
            InsertionSlot::New
        ));
    }

    #[test]
    fn get_insertion_slot_reuses_first_invalid_slot() {
        let mut page = Page::new_empty(PageId::new(1, 0), PageType::Keys).unwrap();
        let slot_count: u16 = 3;
        page.header_mut()
            .unwrap()
            .set_slot_count(slot_count)
            .unwrap();
        let new_free_end = (PAGE_SIZE - 1 - (slot_count as usize * SLOT_SIZE)) as u16;
        page.header_mut()
            .unwrap()
            .set_free_end(new_free_end)
            .unwrap();

        {
            let mut sa = page.slot_array_mut().unwrap();
            sa.set_slot(1, HEADER_SIZE as u16, 10).unwrap();
            sa.set_slot(2, (HEADER_SIZE + 10) as u16, 20).unwrap();
        }

        assert!(matches!(
            page.get_insertion_slot().unwrap(),
            InsertionSlot::Reuse(0)
        ));
    }

    #[test]
    fn find_insertion_offset_fast_path_returns_free_start() {
        let mut page = Page::new_empty(PageId::new(1, 0), PageType::Keys).unwrap();
        page.header_mut().unwrap().set_free_start(100).unwrap();
        page.header_mut()
            .unwrap()
            .set_free_end((PAGE_SIZE - 1) as u16)
            .unwrap();

        let res = page.find_insertion_offset(50, None).unwrap();
        assert!(matches!(res, InsertionOffset::Exact(100)));
    }

    #[test]
    fn find_insertion_offset_finds_gap_between_rows() {
        let mut page = Page::new_empty(PageId::new(1, 0), PageType::Keys).unwrap();
        let slot_count: u16 = 2;
        page.header_mut()
            .unwrap()
            .set_slot_count(slot_count)
            .unwrap();
        let new_free_end = (PAGE_SIZE - 1 - (slot_count as usize * SLOT_SIZE)) as u16;
        page.header_mut()
            .unwrap()
            .set_free_end(new_free_end)
            .unwrap();
        page.header_mut()
            .unwrap()
            .set_free_start(new_free_end - 5)
            .unwrap();

        {
            let mut sa = page.slot_array_mut().unwrap();
            sa.set_slot(0, HEADER_SIZE as u16, 10).unwrap();
            sa.set_slot(1, (HEADER_SIZE + 30) as u16, 10).unwrap();
        }

        let expected = HEADER_SIZE + 10;
        let res = page.find_insertion_offset(15, None).unwrap();
        assert!(matches!(res, InsertionOffset::Exact(pos) if pos == expected));
    }

    #[test]
    fn find_insertion_offset_no_contiguous_placement_requires_compaction() {
        let mut page = Page::new_empty(PageId::new(1, 0), PageType::Keys).unwrap();
        let slot_count: u16 = 2;
        page.header_mut()
            .unwrap()
            .set_slot_count(slot_count)
            .unwrap();
        let new_free_end = (PAGE_SIZE - 1 - (slot_count as usize * SLOT_SIZE)) as u16;
        page.header_mut()
            .unwrap()
            .set_free_end(new_free_end)
            .unwrap();
        page.header_mut()
            .unwrap()
            .set_free_start(new_free_end - 5)
            .unwrap();

        {
            let mut sa = page.slot_array_mut().unwrap();
            sa.set_slot(0, new_free_end - 40, 20).unwrap();
            sa.set_slot(1, new_free_end - 20, 20).unwrap();
        }

        let res = page.find_insertion_offset(10, None).unwrap();
        assert!(matches!(res, InsertionOffset::AfterCompactionFreeStart));
    }

    #[test]
    fn find_insertion_offset_skip_slot_for_updates_gap_correctly_identified() {
        let mut page = Page::new_empty(PageId::new(1, 0), PageType::Keys).unwrap();
        let slot_count: u16 = 3;
        page.header_mut()
            .unwrap()
            .set_slot_count(slot_count)
            .unwrap();
        let new_free_end = (PAGE_SIZE - 1 - (slot_count as usize * SLOT_SIZE)) as u16;
        page.header_mut().unwrap().set_free_end(new_free_end).unwrap();
        page.header_mut()
            .unwrap()
            .set_free_start(new_free_end - 5)
            .unwrap();

        {
            let mut sa = page.slot_array_mut().unwrap();
            sa.set_slot(0, 96, 104).unwrap();
            sa.set_slot(2, 250, 3827).unwrap();
        }

        let res = page.find_insertion_offset(150, Some(0)).unwrap();
        assert!(matches!(res, InsertionOffset::Exact(96)));
    }
}
