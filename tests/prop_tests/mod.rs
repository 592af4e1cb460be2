mod prop_sort;
